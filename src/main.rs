//! procfrag - version 0.1.0
//!
//! Physical-memory fragmentation reporter with tracing logging. This is the
//! main entry point: it runs the one-shot scan at startup, freezes the
//! snapshot, and serves it over HTTP until shutdown.

mod cli;
mod config;
mod handlers;
mod state;

use axum::{routing::get, Router};
use clap::Parser;
use procfrag::{
    render_report, run_scan, BoundaryPolicy, ProcfsSource, ScanError, Snapshot, SyntheticSource,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};

use cli::{Args, Commands, LogLevel};
use config::{
    format_config, resolve_config, show_config, validate_effective_config, Config,
    DEFAULT_BIND_ADDR, DEFAULT_PORT, DEFAULT_SYNTHETIC_PROCESSES, DEFAULT_SYNTHETIC_SEED,
};
use handlers::{health_handler, report_handler, root_handler};
use state::AppState;

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => Level::ERROR,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {:?}", args.log_level);
}

/// Runs the one-shot scan against the configured process source.
fn scan_snapshot(config: &Config) -> Result<Snapshot, ScanError> {
    if config.synthetic.unwrap_or(false) {
        let count = config
            .synthetic_processes
            .unwrap_or(DEFAULT_SYNTHETIC_PROCESSES);
        let seed = config.synthetic_seed.unwrap_or(DEFAULT_SYNTHETIC_SEED);
        info!(
            "Scanning synthetic population: {} processes, seed {}",
            count, seed
        );
        run_scan(&SyntheticSource::generate(count, seed), BoundaryPolicy::default())
    } else {
        run_scan(&ProcfsSource::new(), BoundaryPolicy::default())
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, &args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        let config = resolve_config(&args)?;
        if let Err(e) = validate_effective_config(&config) {
            eprintln!("❌ Configuration invalid: {}", e);
            std::process::exit(1);
        }

        return match command {
            Commands::Check { synthetic } => {
                setup_logging(&args);
                let mut config = config;
                if *synthetic {
                    config.synthetic = Some(true);
                }
                let snapshot = scan_snapshot(&config)?;
                print!("{}", render_report(&snapshot));
                Ok(())
            }

            Commands::Config { output, format } => {
                let rendered = format_config(&config, format)?;
                match output {
                    Some(path) => {
                        std::fs::write(path, rendered)?;
                        println!("Configuration written to {}", path.display());
                    }
                    None => println!("{}", rendered),
                }
                Ok(())
            }
        };
    }

    // Load configuration for main server mode
    let config = resolve_config(&args)?;

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&args);

    info!("Starting procfrag");

    // The scan runs exactly once, before the endpoint exists. A scan failure
    // is fatal: no partial snapshot is ever published.
    let snapshot = match scan_snapshot(&config) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Scan failed, report endpoint will not be registered: {}", e);
            return Err(e.into());
        }
    };

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);

    let state = Arc::new(AppState {
        snapshot: Arc::new(snapshot),
        config: Arc::new(config.clone()),
        start_time: Instant::now(),
    });

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/proc_report", get(report_handler));

    if config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    let app = app.with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!("procfrag listening on http://{}:{}", bind_ip_str, port);

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received, exiting...");
        }
    }

    info!("procfrag stopped gracefully");
    Ok(())
}
