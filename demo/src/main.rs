//! WARDEN operator CLI.
//!
//! Parses and evaluates agent policy documents, requests policies from the
//! configured generator, and runs the built-in reference scenarios.
//!
//! Usage:
//!   cargo run -p demo -- check policy.cedar
//!   cargo run -p demo -- evaluate policy.cedar --principal authenticated-x --action trade
//!   cargo run -p demo -- generate --config warden.toml --agent-id agent-42 \
//!       --task "rebalance portfolio" --auth-level mfa --principal trader-1 --action trade
//!   cargo run -p demo -- scenarios

mod scenarios;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use warden_audit::InMemoryAuditTrail;
use warden_contracts::{
    agent::AuthenticationLevel,
    error::{WardenError, WardenResult},
    request::AuthorizationRequest,
};
use warden_core::{GenerationAdapter, PolicyStore, WardenConfig};
use warden_generator::HttpPolicyGenerator;
use warden_policy::{parse_report, RuleSet};

// ── CLI definition ────────────────────────────────────────────────────────────

/// WARDEN — deny-by-default authorization for autonomous agents.
#[derive(Parser)]
#[command(
    name = "warden",
    about = "Parse, evaluate, and generate agent authorization policies",
    long_about = "Parses permit/forbid policy documents, decides authorization requests\n\
                  (forbid overrides permit, default deny), and requests policies from\n\
                  an external generator with an audited, hash-chained trail."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a policy document and list its rules and discarded blocks.
    Check {
        /// Path to the policy document.
        policy: PathBuf,
    },
    /// Decide one request against a policy document.
    Evaluate {
        /// Path to the policy document.
        policy: PathBuf,
        #[arg(long)]
        principal: String,
        #[arg(long)]
        action: String,
        #[arg(long, default_value = "*")]
        resource: String,
    },
    /// Request a policy from the configured generator, then decide one request.
    Generate {
        /// Path to the TOML configuration.
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        agent_id: String,
        #[arg(long)]
        task: String,
        /// anonymous, basic, oauth, or mfa.
        #[arg(long, default_value = "basic")]
        auth_level: String,
        /// Role held by the agent; repeatable.
        #[arg(long = "role")]
        roles: Vec<String>,
        #[arg(long)]
        principal: String,
        #[arg(long)]
        action: String,
        #[arg(long, default_value = "*")]
        resource: String,
    },
    /// Run the built-in reference scenarios.
    Scenarios,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { policy } => run_check(&policy),
        Command::Evaluate {
            policy,
            principal,
            action,
            resource,
        } => run_evaluate(&policy, principal, action, resource),
        Command::Generate {
            config,
            agent_id,
            task,
            auth_level,
            roles,
            principal,
            action,
            resource,
        } => {
            let request = AuthorizationRequest::new(agent_id, principal, action, resource);
            run_generate(&config, &task, &auth_level, roles, request).await
        }
        Command::Scenarios => {
            run_scenarios().await;
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("warden: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn read_policy(path: &Path) -> WardenResult<String> {
    std::fs::read_to_string(path).map_err(|e| WardenError::ConfigError {
        reason: format!("failed to read policy file '{}': {}", path.display(), e),
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> WardenResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| WardenError::ConfigError {
        reason: format!("failed to render output: {}", e),
    })
}

fn run_check(path: &Path) -> WardenResult<()> {
    let document = read_policy(path)?;
    let report = parse_report(&document);

    println!("{} rule(s), {} discarded block(s)", report.rules.len(), report.discarded.len());
    for rule in &report.rules {
        println!(
            "  [{}] line {:>3}  {:?}  principal={:?}  action={:?}",
            rule.id, rule.line, rule.effect, rule.principal, rule.action
        );
    }
    for block in &report.discarded {
        println!("  discarded at line {:>3}: {}", block.line, block.reason);
    }
    Ok(())
}

fn run_evaluate(
    path: &Path,
    principal: String,
    action: String,
    resource: String,
) -> WardenResult<()> {
    let rules = RuleSet::parse(&read_policy(path)?);
    let request = AuthorizationRequest::new("cli", principal, action, resource);

    println!("{}", to_json(&rules.explain(&request))?);
    Ok(())
}

async fn run_generate(
    config_path: &Path,
    task: &str,
    auth_level: &str,
    roles: Vec<String>,
    request: AuthorizationRequest,
) -> WardenResult<()> {
    let config = WardenConfig::from_file(config_path)?;
    let level: AuthenticationLevel = auth_level.parse()?;

    let trail = Arc::new(InMemoryAuditTrail::new(format!("cli-{}", request.agent_id)));
    let store = Arc::new(PolicyStore::with_audit(trail.clone()));
    let generator = Arc::new(HttpPolicyGenerator::from_config(&config.generator)?);
    let adapter = GenerationAdapter::from_config(store.clone(), generator, &config);
    info!(
        agent_id = %request.agent_id,
        endpoint = %config.generator.endpoint,
        "requesting generated policy"
    );

    // A failed generation is audited; print the trail before surfacing it.
    let generated = adapter
        .request_policy(&request.agent_id, task, level, roles)
        .await;
    if let Ok(record) = &generated {
        println!("{} rule(s) registered for {}", record.rules.len(), record.agent_id);
        println!("{}", record.raw_text.trim());
        println!();
        println!("{}", to_json(&store.explain(&request.agent_id, &request))?);
    }

    println!("{}", to_json(&trail.export_log()?)?);
    generated.map(|_| ())
}

async fn run_scenarios() {
    let results = scenarios::run_all().await;
    let failed = results.iter().filter(|r| !r.passed).count();

    for result in &results {
        let mark = if result.passed { "PASS" } else { "FAIL" };
        println!("  [{}] {}  ({})", mark, result.name, result.detail);
    }
    println!();

    if failed > 0 {
        eprintln!("{} of {} scenario(s) failed.", failed, results.len());
        std::process::exit(1);
    }
    println!("All {} scenarios passed.", results.len());
}
