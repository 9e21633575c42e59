// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use autorun_adapters::{
    ChannelDispatch, FsScriptDirectory, ProcessScript, ProcessScriptConfig, ScriptDirectory,
    SessionHost, TracedDirectory,
};
use autorun_core::{SessionEvent, SystemClock, UuidIdGen};
use autorun_engine::{AutostartConfig, AutostartDeps, AutostartService, Delays};
use fs2::FileExt;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::env;

/// Service with the daemon's concrete adapters
pub type DaemonService =
    AutostartService<TracedDirectory<Arc<FsScriptDirectory>>, SessionHost, SystemClock>;

/// Errors that can stop the daemon from starting
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Invalid config file {0}: {1}")]
    Config(PathBuf, #[source] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Optional `autorun.toml` in the state directory
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Program and leading arguments used to run a script file
    pub interpreter: Option<Vec<String>>,
    pub delays: DelaysConfig,
}

/// `[delays]` table, all in milliseconds
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelaysConfig {
    pub settle_ms: Option<u64>,
    pub inter_task_ms: Option<u64>,
    pub restart_settle_ms: Option<u64>,
}

impl DelaysConfig {
    /// Override the fields that are set
    pub fn apply(&self, base: Delays) -> Delays {
        Delays {
            settle: self.settle_ms.map(Duration::from_millis).unwrap_or(base.settle),
            inter_task: self
                .inter_task_ms
                .map(Duration::from_millis)
                .unwrap_or(base.inter_task),
            restart_settle: self
                .restart_settle_ms
                .map(Duration::from_millis)
                .unwrap_or(base.restart_settle),
        }
    }
}

impl FileConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, LifecycleError> {
        toml::from_str(text).map_err(|e| LifecycleError::Config(path.to_path_buf(), e))
    }

    /// Read `path`, treating a missing file as defaults
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/autorun)
    pub state_dir: PathBuf,
    /// Directory holding the script files
    pub script_dir: PathBuf,
    /// Persisted autostart list
    pub store_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the optional config file
    pub config_path: PathBuf,
    pub delays: Delays,
    pub process: ProcessScriptConfig,
}

impl Config {
    /// Load configuration from the environment and `autorun.toml`.
    pub fn load() -> Result<Self, LifecycleError> {
        Self::for_state_dir(env::state_dir()?, env::script_dir())
    }

    pub fn for_state_dir(
        state_dir: PathBuf,
        script_dir: Option<PathBuf>,
    ) -> Result<Self, LifecycleError> {
        let config_path = state_dir.join("autorun.toml");
        let file = FileConfig::load(&config_path)?;

        let mut process = ProcessScriptConfig::default();
        if let Some(interpreter) = file.interpreter {
            process.interpreter = interpreter;
        }

        Ok(Self {
            script_dir: script_dir.unwrap_or_else(|| state_dir.join("scripts")),
            store_path: state_dir.join("autostart.json"),
            lock_path: state_dir.join("autorund.pid"),
            log_path: state_dir.join("autorund.log"),
            delays: file.delays.apply(Delays::default()),
            process,
            config_path,
            state_dir,
        })
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub service: DaemonService,
    pub host: SessionHost,
    pub scripts: Arc<FsScriptDirectory>,
}

/// Start the daemon: lock, scan scripts, load the autostart list.
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;
    std::fs::create_dir_all(&config.script_dir)?;

    // Open without truncating so a running daemon's PID survives a failed lock
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let scripts = Arc::new(FsScriptDirectory::new(&config.script_dir));
    let (added, _) = refresh_scripts(&scripts, &config.process);
    info!(scripts = added, dir = %config.script_dir.display(), "scanned scripts");

    let (dispatch, _ui_thread) = ChannelDispatch::spawn("autorun-ui")?;
    let host = SessionHost::new();
    let service = AutostartService::new(
        AutostartConfig::new(&config.store_path).with_delays(config.delays),
        AutostartDeps {
            directory: TracedDirectory::new(Arc::clone(&scripts)),
            host: host.clone(),
            dispatch: Arc::new(dispatch),
            ids: UuidIdGen,
        },
        SystemClock,
    );
    if service.initialize().await.is_none() {
        warn!("ui dispatch closed during startup");
    }

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        service,
        host,
        scripts,
    })
}

impl DaemonState {
    /// Update host state for `event` before the service sees it.
    ///
    /// A connect rescans the scripts directory so files added while
    /// disconnected get live handles.
    pub fn prepare(&self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => {
                let (added, removed) = refresh_scripts(&self.scripts, &self.config.process);
                if added > 0 || removed > 0 {
                    info!(added, removed, "rescanned scripts");
                }
                self.host.set_connected(true);
            }
            SessionEvent::Disconnected => self.host.set_connected(false),
        }
    }

    /// Stop the in-flight pass and cancel running scripts.
    pub fn shutdown(&self) {
        info!("Shutting down daemon...");
        self.host.set_connected(false);
        self.service.shutdown();
    }
}

/// Register handles for new script files and drop handles whose file is gone.
///
/// Returns `(added, removed)`.
pub fn refresh_scripts(
    scripts: &FsScriptDirectory,
    process: &ProcessScriptConfig,
) -> (usize, usize) {
    let on_disk = scripts.list();

    let mut added = 0;
    for id in &on_disk {
        if scripts.resolve(id).is_some() {
            continue;
        }
        let Some(path) = scripts.file_path(id) else {
            continue;
        };
        scripts.register(ProcessScript::new(id.clone(), path, process.clone()));
        added += 1;
    }

    let mut removed = 0;
    for handle in scripts.handles() {
        if !on_disk.contains(handle.script_id()) {
            scripts.unregister(handle.script_id());
            removed += 1;
        }
    }

    (added, removed)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
