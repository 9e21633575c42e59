// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduling pass: start every eligible task in order

use crate::registry::AutostartTask;
use autorun_core::ScriptId;
use std::sync::Arc;
use std::time::Duration;

/// What a scheduling pass did with each task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub started: Vec<ScriptId>,
    /// No live script
    pub skipped_missing: Vec<ScriptId>,
    /// Live script not backed by a saved file
    pub skipped_unsaved: Vec<ScriptId>,
    pub skipped_running: Vec<ScriptId>,
    pub load_failed: Vec<ScriptId>,
}

impl PassReport {
    pub fn skipped(&self) -> usize {
        self.skipped_missing.len() + self.skipped_unsaved.len() + self.skipped_running.len()
    }
}

/// Walk `tasks` in order, loading and executing each eligible one.
///
/// A task is eligible when its script is alive, saved to disk and not
/// already running. Scripts that fail to load are skipped. After every
/// execute the pass waits `inter_task` before moving on.
pub async fn run_pass(tasks: &[Arc<AutostartTask>], inter_task: Duration) -> PassReport {
    let mut report = PassReport::default();

    for task in tasks {
        let id = task.script_id().clone();
        let Some(handle) = task.handle() else {
            report.skipped_missing.push(id);
            continue;
        };
        if !handle.is_saved_to_disk() {
            report.skipped_unsaved.push(id);
            continue;
        }
        if handle.is_running() {
            tracing::debug!(script = %id, "already running");
            report.skipped_running.push(id);
            continue;
        }

        if !handle.is_loaded() {
            if let Err(e) = handle.load().await {
                tracing::warn!(script = %id, error = %e, "failed to load script, skipping");
                report.load_failed.push(id);
                continue;
            }
        }

        tracing::info!(script = %id, "starting");
        handle.execute();
        report.started.push(id);
        // Release the strong reference before sleeping
        drop(handle);
        tokio::time::sleep(inter_task).await;
    }

    report
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
