// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripts run as child processes

use super::{ChangeListener, HandleChange, ListenerId, Listeners, ScriptError, ScriptHandle};
use async_trait::async_trait;
use autorun_core::{ScriptId, ScriptStatus};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::oneshot;

/// How script files are launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessScriptConfig {
    /// Program and leading arguments; the script path is appended.
    /// Empty means the script file is executed directly.
    pub interpreter: Vec<String>,
}

impl Default for ProcessScriptConfig {
    fn default() -> Self {
        Self {
            interpreter: vec!["sh".to_string()],
        }
    }
}

#[derive(Default)]
struct ProcessState {
    status: ScriptStatus,
    status_text: String,
    running: bool,
    compiling: bool,
    loaded: bool,
    cancel: Option<oneshot::Sender<()>>,
}

/// A script file executed through an interpreter process.
pub struct ProcessScript {
    id: ScriptId,
    path: PathBuf,
    config: ProcessScriptConfig,
    state: Mutex<ProcessState>,
    listeners: Listeners,
    me: Weak<ProcessScript>,
}

impl ProcessScript {
    pub fn new(id: ScriptId, path: PathBuf, config: ProcessScriptConfig) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id,
            path,
            config,
            state: Mutex::new(ProcessState::default()),
            listeners: Listeners::new(),
            me: me.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command(&self) -> Command {
        let mut cmd = match self.config.interpreter.split_first() {
            Some((program, args)) => {
                let mut cmd = Command::new(program);
                cmd.args(args).arg(&self.path);
                cmd
            }
            None => Command::new(&self.path),
        };
        if let Some(dir) = self.path.parent() {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }

    async fn run(&self, cancel_rx: oneshot::Receiver<()>) {
        let start = Instant::now();
        let (status, text) = match self.command().spawn() {
            Err(e) => (ScriptStatus::Faulted, format!("failed to start: {}", e)),
            Ok(mut child) => {
                tokio::select! {
                    exit = child.wait() => match exit {
                        Ok(code) if code.success() => (
                            ScriptStatus::Complete,
                            format!("completed in {:.1}s", start.elapsed().as_secs_f64()),
                        ),
                        Ok(code) => (ScriptStatus::Faulted, format!("exited with {}", code)),
                        Err(e) => (ScriptStatus::Faulted, format!("wait failed: {}", e)),
                    },
                    _ = cancel_rx => {
                        if let Err(e) = child.kill().await {
                            tracing::warn!(script = %self.id, error = %e, "kill failed");
                        }
                        (ScriptStatus::Canceled, "canceled".to_string())
                    }
                }
            }
        };
        tracing::info!(
            script = %self.id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            status = ?status,
            "script finished"
        );
        {
            let mut state = self.state.lock();
            state.running = false;
            state.cancel = None;
            state.status = status;
            state.status_text = text;
        }
        self.listeners.emit(HandleChange::Running);
        self.listeners.emit(HandleChange::Status);
    }

    fn set_compiling(&self, compiling: bool) {
        self.state.lock().compiling = compiling;
        self.listeners.emit(HandleChange::Compiling);
    }
}

#[async_trait]
impl ScriptHandle for ProcessScript {
    fn script_id(&self) -> &ScriptId {
        &self.id
    }

    fn name(&self) -> String {
        self.id.file_stem().to_string()
    }

    fn status(&self) -> ScriptStatus {
        self.state.lock().status
    }

    fn status_text(&self) -> String {
        self.state.lock().status_text.clone()
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }

    fn is_compiling(&self) -> bool {
        self.state.lock().compiling
    }

    fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    fn is_saved_to_disk(&self) -> bool {
        self.path.is_file()
    }

    async fn load(&self) -> Result<(), ScriptError> {
        self.set_compiling(true);
        let result = match tokio::fs::read(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScriptError::NotFound(self.path.display().to_string()))
            }
            Err(e) => Err(ScriptError::Io(e)),
        };
        {
            let mut state = self.state.lock();
            state.compiling = false;
            match &result {
                Ok(()) => state.loaded = true,
                Err(e) => {
                    state.loaded = false;
                    state.status = ScriptStatus::CompileError;
                    state.status_text = e.to_string();
                }
            }
        }
        self.listeners.emit(HandleChange::Compiling);
        self.listeners.emit(HandleChange::Loaded);
        result
    }

    fn execute(&self) {
        let Some(me) = self.me.upgrade() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(script = %self.id, "execute called outside a tokio runtime");
            return;
        };
        let (cancel_tx, cancel_rx) = oneshot::channel();
        {
            let mut state = self.state.lock();
            if state.running {
                return;
            }
            state.running = true;
            state.status = ScriptStatus::Running;
            state.status_text = "running".to_string();
            state.cancel = Some(cancel_tx);
        }
        tracing::info!(script = %self.id, path = %self.path.display(), "script started");
        self.listeners.emit(HandleChange::Running);
        runtime.spawn(async move { me.run(cancel_rx).await });
    }

    fn cancel(&self) {
        let cancel = self.state.lock().cancel.take();
        if let Some(tx) = cancel {
            tracing::info!(script = %self.id, "cancel requested");
            let _ = tx.send(());
        }
    }

    fn subscribe(&self, listener: ChangeListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.remove(id);
    }

    fn notify_autostart_changed(&self) {
        self.listeners.emit(HandleChange::Autostart);
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
