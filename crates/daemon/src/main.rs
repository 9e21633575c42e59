// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Autorun Daemon (autorund)
//!
//! Background process that runs autostart scripts when a session connects.
//!
//! Signals:
//! - SIGUSR1: session connected
//! - SIGUSR2: session disconnected
//! - SIGTERM / SIGINT: cancel running scripts and exit

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::{Path, PathBuf};

use autorun_core::SessionEvent;
use autorun_daemon::lifecycle::{self, Config, DaemonState, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("autorund {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("autorund {}", env!("CARGO_PKG_VERSION"));
                println!("Autorun Daemon - runs autostart scripts when a session connects");
                println!();
                println!("USAGE:");
                println!("    autorund");
                println!();
                println!("SIGNALS:");
                println!("    SIGUSR1          Session connected");
                println!("    SIGUSR2          Session disconnected");
                println!("    SIGTERM/SIGINT   Stop running scripts and exit");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: autorund [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    rotate_log_if_needed(&config.log_path);
    let log_guard = setup_logging(&config)?;

    info!("Starting autorun daemon");

    let daemon = match lifecycle::startup(&config).await {
        Ok(daemon) => daemon,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("autorund is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let (event_tx, event_rx) = mpsc::channel(16);
    let service = daemon.service.clone();
    let runner = tokio::spawn(async move { service.run(event_rx).await });

    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    let mut sigusr2 = signal(SignalKind::user_defined2())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, watching {}",
        daemon.config.script_dir.display()
    );
    println!("READY");

    loop {
        tokio::select! {
            _ = sigusr1.recv() => {
                forward(&daemon, &event_tx, SessionEvent::Connected).await;
            }
            _ = sigusr2.recv() => {
                forward(&daemon, &event_tx, SessionEvent::Disconnected).await;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    drop(event_tx);
    if let Err(e) = runner.await {
        warn!("event loop ended abnormally: {}", e);
    }
    daemon.shutdown();
    info!("Daemon stopped");
    Ok(())
}

async fn forward(daemon: &DaemonState, tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    daemon.prepare(event);
    if tx.send(event).await.is_err() {
        warn!(event = event.name(), "event loop closed, dropping session event");
    }
}

/// Rotate the log once it grows past this size
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated logs kept (`.1` is the newest)
const MAX_ROTATED_LOGS: u32 = 3;

/// Move an oversized log to `<log>.1`, shifting older rotations up.
fn rotate_log_if_needed(log_path: &Path) {
    let Ok(meta) = std::fs::metadata(log_path) else {
        return;
    };
    if meta.len() <= MAX_LOG_SIZE {
        return;
    }

    let rotated = |n: u32| -> PathBuf {
        let mut name = log_path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    };

    let _ = std::fs::remove_file(rotated(MAX_ROTATED_LOGS));
    for n in (1..MAX_ROTATED_LOGS).rev() {
        let from = rotated(n);
        if from.exists() {
            let _ = std::fs::rename(&from, rotated(n + 1));
        }
    }
    let _ = std::fs::rename(log_path, rotated(1));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
