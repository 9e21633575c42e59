// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User commands on autostart tasks (remove, stop, restart)

use crate::registry::AutostartTask;
use crate::service::AutostartService;
use autorun_adapters::{invoke, ScriptDirectory, ScriptHost};
use autorun_core::{Clock, IdGen, ScriptId};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Command issued from the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    Remove(ScriptId),
    Stop(ScriptId),
    Restart(ScriptId),
}

impl TaskCommand {
    pub fn script_id(&self) -> &ScriptId {
        match self {
            Self::Remove(id) | Self::Stop(id) | Self::Restart(id) => id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Remove(_) => "remove",
            Self::Stop(_) => "stop",
            Self::Restart(_) => "restart",
        }
    }
}

/// How a restart ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// Executed again after the settle delay
    Restarted,
    /// The host stopped allowing execution, or the script went away or
    /// lost its file during the delay
    Abandoned,
    /// The task had no live script
    Unbound,
}

impl<D, H, C, I> AutostartService<D, H, C, I>
where
    D: ScriptDirectory,
    H: ScriptHost,
    C: Clock,
    I: IdGen,
{
    /// Disable autostart for the task and tell its script.
    pub async fn remove(&self, task: &AutostartTask) -> bool {
        let handle = task.handle();
        let script_id = task.script_id().clone();
        let inner = Arc::clone(&self.inner);
        let removed = invoke(self.inner.dispatch.as_ref(), move || {
            let mut registry = inner.registry.lock();
            let mut store = inner.store.lock();
            registry.disable(&mut store, &script_id)
        })
        .await
        .unwrap_or(false);

        if let Some(handle) = handle {
            handle.notify_autostart_changed();
        }
        removed
    }

    /// Cancel the task's script if it is running.
    pub fn stop(&self, task: &AutostartTask) -> bool {
        match task.handle() {
            Some(handle) if handle.is_running() => {
                tracing::info!(script = %task.script_id(), "stopping");
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    /// Cancel the task's script if running, then execute it again after
    /// the restart settle delay.
    ///
    /// The returned handle resolves once the restart ran or was abandoned.
    /// Returns `None`, leaving the script untouched, when called outside a
    /// tokio runtime.
    pub fn restart(&self, task: &AutostartTask) -> Option<JoinHandle<RestartOutcome>> {
        let script_id = task.script_id().clone();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(script = %script_id, "restart called outside a tokio runtime");
            return None;
        };
        let weak = task.handle().map(|handle| {
            if handle.is_running() {
                tracing::info!(script = %script_id, "cancelling before restart");
                handle.cancel();
            }
            Arc::downgrade(&handle)
        });
        let inner = Arc::clone(&self.inner);

        Some(runtime.spawn(async move {
            let Some(weak) = weak else {
                return RestartOutcome::Unbound;
            };
            tokio::time::sleep(inner.delays.restart_settle).await;

            match weak.upgrade() {
                Some(handle) if inner.host.can_execute() && handle.is_saved_to_disk() => {
                    tracing::info!(script = %script_id, "restarting");
                    handle.execute();
                    RestartOutcome::Restarted
                }
                _ => {
                    tracing::debug!(script = %script_id, "restart abandoned");
                    RestartOutcome::Abandoned
                }
            }
        }))
    }

    /// Run `command` against the task it names. Unknown ids are ignored.
    pub async fn dispatch(&self, command: TaskCommand) {
        let Some(task) = self.find(command.script_id().as_str()) else {
            tracing::debug!(
                command = command.name(),
                script = %command.script_id(),
                "no such task"
            );
            return;
        };
        match command {
            TaskCommand::Remove(_) => {
                self.remove(&task).await;
            }
            TaskCommand::Stop(_) => {
                self.stop(&task);
            }
            TaskCommand::Restart(_) => {
                drop(self.restart(&task));
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
