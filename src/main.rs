//! Catalog service entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use catalog_service::api::{create_router, AppState};
use catalog_service::catalog::store_from_config;
use catalog_service::config::Config;
use catalog_service::metrics;
use catalog_service::utils::shutdown_signal;

/// Product catalog HTTP service.
#[derive(Parser, Debug)]
#[command(name = "catalog-service")]
#[command(about = "Product catalog API with circuit breaker and health checks")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP port (overrides CATALOG_HTTP_PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the catalog API (default).
    Run {
        /// HTTP port (overrides CATALOG_HTTP_PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("catalog_service=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Run { port }) => cmd_run(port.or(args.port)).await,
        None => cmd_run(args.port).await,
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CATALOG SERVICE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen: {}:{}", config.catalog_bind_address, config.catalog_http_port);
    match (&config.catalog_store_url, &config.catalog_seed_file) {
        (Some(url), _) => println!("  Store: upstream catalog at {}", url),
        (None, Some(seed)) => println!("  Store: in-memory, seeded from {}", seed.display()),
        (None, None) => println!("  Store: in-memory (empty)"),
    }
    println!(
        "  Circuit Breaker: max {} failures, {}ms call timeout, {}ms reset",
        config.circuit_max_failures, config.circuit_timeout_ms, config.circuit_reset_timeout_ms
    );
    println!("  Fallback On Failure: {}", config.circuit_fallback_on_failure);
    println!("  Health Check Timeout: {}ms", config.health_check_timeout_ms);
    match config.metrics_port {
        Some(port) => println!("  Metrics: port {}", port),
        None => println!("  Metrics: disabled"),
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Serve the catalog API until a shutdown signal arrives.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(port) = port_override {
        config.catalog_http_port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    if let Some(metrics_port) = config.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], metrics_port));
        metrics::install_prometheus(addr)?;
    }
    // Descriptions only reach a recorder that is already installed.
    metrics::init_metrics();

    let store = store_from_config(&config)?;
    let state = AppState::from_config(&config, store);
    info!(
        max_failures = config.circuit_max_failures,
        timeout_ms = config.circuit_timeout_ms,
        reset_timeout_ms = config.circuit_reset_timeout_ms,
        "Circuit breaker configured"
    );

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}
