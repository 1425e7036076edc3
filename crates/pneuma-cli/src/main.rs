//! Pneuma - headless host for the breathing session kernel
//!
//! The binary provides:
//! - Pattern catalog listing
//! - Session driving on real or virtual time, with Ctrl+C as HALT
//! - Offline integrity checks of dumped event logs

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use pneuma_kernel::{verify_entries, LoggedEvent, PatternCatalog};
use pneuma_types::Millis;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pneuma_cli::config::PneumaConfig;
use pneuma_cli::registry;
use pneuma_cli::session::{SessionOptions, SessionRunner};

/// Pneuma CLI
#[derive(Parser)]
#[command(name = "pneuma")]
#[command(about = "Pneuma - guided breathing session kernel", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PNEUMA_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides the config file)
    #[arg(long, env = "PNEUMA_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "PNEUMA_LOG_JSON", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the pattern catalog
    Patterns,

    /// Drive one session
    Run(RunArgs),

    /// Re-check the integrity hashes of a dumped event log
    VerifyLog {
        /// Path to a JSON log written by `run --dump-log`
        path: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Pattern id
    #[arg(short, long)]
    pattern: Option<String>,

    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<u32>,

    /// Run on a virtual clock without sleeping
    #[arg(long)]
    simulate: bool,

    /// Mark the host hidden after this many session seconds
    #[arg(long, value_name = "SECS")]
    hidden_after: Option<f64>,

    /// Write the event log as JSON when the session ends
    #[arg(long, value_name = "PATH")]
    dump_log: Option<PathBuf>,

    /// Trust registry file
    #[arg(long, env = "PNEUMA_REGISTRY")]
    registry: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = PneumaConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Command::Patterns => list_patterns(&config),
        Command::Run(args) => run(config, args).await,
        Command::VerifyLog { path } => verify_log(&path),
    }
}

fn build_catalog(config: &PneumaConfig) -> anyhow::Result<PatternCatalog> {
    let mut catalog = PatternCatalog::builtin();
    let added = catalog
        .merge(config.patterns.iter().cloned())
        .context("Invalid pattern in configuration")?;
    if added > 0 {
        info!(added, "User patterns merged");
    }
    Ok(catalog)
}

fn list_patterns(config: &PneumaConfig) -> anyhow::Result<()> {
    let catalog = build_catalog(config)?;
    println!("{:<12} {:<16} {:>6} {:>6} {:>6} {:>6}  {:<6} {:>6}", "ID", "LABEL", "IN", "HOLD", "OUT", "HOLD", "TIER", "CYCLES");
    for p in catalog.iter() {
        let t = &p.timings;
        println!(
            "{:<12} {:<16} {:>6.1} {:>6.1} {:>6.1} {:>6.1}  {:<6} {:>6}",
            p.id,
            p.label,
            t.inhale,
            t.hold_in,
            t.exhale,
            t.hold_out,
            u8::from(p.tier),
            p.recommended_cycles
        );
    }
    Ok(())
}

async fn run(mut config: PneumaConfig, args: RunArgs) -> anyhow::Result<()> {
    // Override with CLI args
    if let Some(pattern) = args.pattern {
        config.session.pattern = pattern;
    }
    if args.cycles.is_some() {
        config.session.cycles = args.cycles;
    }
    if args.simulate {
        config.session.simulate = true;
    }
    if args.hidden_after.is_some() {
        config.session.simulate_hidden_after_secs = args.hidden_after;
    }
    if args.registry.is_some() {
        config.registry.path = args.registry;
    }

    let catalog = build_catalog(&config)?;
    let mut trust = match &config.registry.path {
        Some(path) => registry::load(path)?,
        None => Default::default(),
    };

    let options = SessionOptions {
        pattern: config.session.pattern.clone(),
        cycles: config.session.cycles,
        tick_period_ms: config.session.tick_period_ms(),
        max_tick_gap_secs: config.session.max_tick_gap_secs,
        hidden_after_secs: config.session.simulate_hidden_after_secs,
    };

    let boot_timestamp = chrono::Utc::now().timestamp_millis().max(0) as Millis;
    let mut runner = SessionRunner::new(catalog, trust.clone(), options, boot_timestamp)?;

    let reason = if config.session.simulate {
        runner.run_simulated()?
    } else {
        runner.run_realtime(shutdown_signal()).await?
    };

    let summary = runner.summary(reason);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = &args.dump_log {
        std::fs::write(path, runner.kernel().log().to_json()?)
            .with_context(|| format!("Failed to write log to {}", path.display()))?;
        info!(path = %path.display(), events = runner.kernel().log().len(), "Event log written");
    }

    let final_state = runner.kernel().state();
    registry::fold_session(&mut trust, &final_state.state, chrono::Utc::now());
    if let Some(path) = &config.registry.path {
        registry::save(path, &trust)?;
    }

    Ok(())
}

fn verify_log(path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let entries: Vec<LoggedEvent> = serde_json::from_str(&raw).context("Not an event log")?;
    let report = verify_entries(&entries);

    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_clean() {
        bail!(
            "log failed verification: {} corrupted, {} out of sequence",
            report.corrupted_events,
            report.sequence_gaps.len()
        );
    }
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed the session runs
/// until its own stop condition.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
