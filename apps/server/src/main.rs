//! Marquee Server - webhook receiver that drives LIFX lights from media playback.
//!
//! Point the media server's webhook at `http://<host>:<port>/` and the lights
//! follow whatever starts playing.

mod config;

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use marquee_core::{bootstrap_services, start_server, AppState};
use tokio::signal;

use crate::config::ServerConfig;

/// Marquee Server - ambient light palettes from media playback webhooks.
#[derive(Parser, Debug)]
#[command(name = "marquee-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE", env = "MARQUEE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "MARQUEE_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Bind port (overrides config file).
    #[arg(short = 'p', long, env = "MARQUEE_PORT")]
    port: Option<u16>,

    /// Logfile path (overrides config file).
    #[arg(long, value_name = "FILE", env = "MARQUEE_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Artwork cache directory (overrides config file).
    #[arg(long, value_name = "DIR", env = "MARQUEE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

/// Copies every log record to stderr and the logfile.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn init_logging(level: log::LevelFilter, logfile: &Path) -> Result<()> {
    if let Some(parent) = logfile.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(logfile)
        .with_context(|| format!("Failed to open logfile: {}", logfile.display()))?;

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(TeeWriter { file })))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log_file) = args.log_file {
        config.logfile = Some(log_file);
    }
    if let Some(cache_dir) = args.cache_dir {
        config.cache_dir = cache_dir;
    }

    // Logging needs the logfile, so it is validated first
    let logfile = config.logfile().context("Invalid configuration")?;
    init_logging(args.log_level, logfile)?;

    log::info!("Marquee Server v{}", env!("CARGO_PKG_VERSION"));

    let core_config = config
        .to_core_config()
        .context("Invalid configuration")?;
    log::info!(
        "Configuration: port={}, cache_dir={}",
        core_config.port,
        core_config.cache_dir.display()
    );

    let services = bootstrap_services(&core_config)
        .await
        .context("Failed to bootstrap services")?;

    log::info!("Services bootstrapped successfully");

    let app_state = AppState::new(&services);
    start_server(app_state, core_config.port, shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, cleaning up...");
}
