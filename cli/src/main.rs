//! Fleet Ledger CLI server
//!
//! ```sh
//! # Run with default config (~/.config/fleet-ledger/config.toml)
//! fleet-ledger
//!
//! # Custom config path
//! fleet-ledger --config /etc/fleet-ledger/config.toml
//!
//! # Override the port
//! fleet-ledger --port 9100
//!
//! # Validate config without starting
//! fleet-ledger --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use fleet_ledger::config::AppConfig;
use fleet_ledger::server::{init_tracing, ServerHandle, ServerOptions};

/// Fleet ledger: vehicle catalog, registry, odometer and recharge card ledgers.
#[derive(Parser, Debug)]
#[command(
    name = "fleet-ledger",
    version,
    about = "Fleet data-integrity service",
    long_about = "REST API over the vehicle catalog, vehicle registry, \
                  odometer ledger and recharge card ledger.\n\n\
                  Default config: ~/.config/fleet-ledger/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "FLEET_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(fleet_ledger::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            eprintln!("Using default configuration.");
            AppConfig::default()
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration: {}", config_path.display());

    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file    : {}", config_path.display());
        println!("   API address    : {}", config.server.address());
        println!("   Database       : {}", config.database.url);
        println!("   Log level      : {}", config.logging.level);
        println!("   Odometer order : {}", config.fleet.odometer_order);
        println!("   Currency       : {}", config.fleet.currency);
        return Ok(());
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
