// ============================================
// File: crates/airrelay-agent/src/main.rs
// ============================================
//! # Airrelay Agent Entry Point
//!
//! ## Creation Reason
//! CLI binary for the airrelay agent: perpetual polling, one-shot
//! invocation, device discovery, and config validation.
//!
//! ## Usage
//! ```bash
//! # Perpetual mode: poll and forward on the configured interval
//! airrelay run
//!
//! # One-shot mode: single cycle, JSON result, exit code 0/1
//! airrelay once
//!
//! # List devices visible to the configured token
//! airrelay devices
//!
//! # Validate a config file
//! airrelay validate --config /etc/airrelay/agent.toml
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - A missing config file is not an error: credentials can come
//!   entirely from environment variables (serverless deployments)
//! - `once` exit code is a contract for external callers; keep 0/1
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use airrelay_agent::scheduler::Cycle;
use airrelay_agent::{AgentConfig, Relay, Scheduler};
use airrelay_core::SensorClient;

// ============================================
// CLI Definition
// ============================================

/// SwitchBot CO2 meter to ThingSpeak relay agent.
#[derive(Parser, Debug)]
#[command(name = "airrelay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the perpetual polling scheduler
    Run {
        /// Path to configuration file
        #[arg(short, long, default_value = "/etc/airrelay/agent.toml")]
        config: PathBuf,
    },

    /// Run a single fetch-and-forward cycle and print a JSON report
    Once {
        /// Path to configuration file
        #[arg(short, long, default_value = "/etc/airrelay/agent.toml")]
        config: PathBuf,
    },

    /// List SwitchBot devices visible to the configured token
    Devices {
        /// Path to configuration file
        #[arg(short, long, default_value = "/etc/airrelay/agent.toml")]
        config: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "/etc/airrelay/agent.toml")]
        config: PathBuf,
    },
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging("info");

    let result = match cli.command {
        Commands::Run { config } => cmd_run(config).await,
        Commands::Once { config } => cmd_once(config).await,
        Commands::Devices { config } => cmd_devices(config).await,
        Commands::Validate { config } => cmd_validate(config).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Runs the perpetual scheduler until Ctrl+C.
async fn cmd_run(config_path: PathBuf) -> anyhow::Result<()> {
    let config = load_config(&config_path).await?;

    // Re-initialize logging with the configured level.
    init_logging(&config.logging.level);

    info!("Starting airrelay agent v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Polling device {} every {} minute(s)",
        config.switchbot.device_id, config.scheduler.interval_minutes
    );

    let relay = Relay::new(&config);
    let scheduler = Scheduler::from_config(&config);

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    scheduler.run(relay, shutdown_rx).await;
    info!("Agent shutdown complete");
    Ok(())
}

/// Runs one cycle and prints a structured JSON report.
///
/// Exit code 0 on success, 1 on failure - the contract for external
/// callers that invoke a single cycle instead of the scheduler.
async fn cmd_once(config_path: PathBuf) -> anyhow::Result<()> {
    let config = load_config(&config_path).await?;
    init_logging(&config.logging.level);

    let relay = Relay::new(&config);
    let report = relay.run().await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Prints the signed device-list response.
///
/// Only the SwitchBot side is validated: device discovery never
/// forwards, so it must work without a ThingSpeak key.
async fn cmd_devices(config_path: PathBuf) -> anyhow::Result<()> {
    let config = read_config(&config_path).await?;
    config.validate_switchbot()?;

    let client = SensorClient::new(config.credentials());
    let devices = client.list_devices().await?;

    println!("{}", serde_json::to_string_pretty(&devices)?);
    Ok(())
}

/// Validates the configuration file and prints a summary.
async fn cmd_validate(config_path: PathBuf) -> anyhow::Result<()> {
    let config = load_config(&config_path).await?;

    println!("Configuration is valid");
    println!();
    println!("SwitchBot:");
    println!("   Device:     {}", config.switchbot.device_id);
    println!();
    println!("Scheduler:");
    println!("   Interval:   {} minute(s)", config.scheduler.interval_minutes);
    println!();
    println!("Logging:");
    println!("   Level:      {}", config.logging.level);

    Ok(())
}

// ============================================
// Helper Functions
// ============================================

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}

/// Loads config from file when present, else from environment only;
/// validates the full merged result.
async fn load_config(path: &PathBuf) -> anyhow::Result<AgentConfig> {
    let config = read_config(path).await?;
    config.validate()?;
    Ok(config)
}

/// Reads config from file when present, else from environment only.
/// Callers validate the sections they use.
async fn read_config(path: &PathBuf) -> anyhow::Result<AgentConfig> {
    if path.exists() {
        return Ok(AgentConfig::load(path).await?);
    }
    info!(
        "Config file {} not found, using environment variables",
        path.display()
    );
    Ok(AgentConfig::from_env())
}
