// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation of the persisted list against the scripts on disk

use crate::registry::TaskRegistry;
use autorun_adapters::{invoke, ScriptDirectory, UiDispatch};
use autorun_storage::AutostartStore;
use parking_lot::Mutex;
use std::sync::Arc;

/// What a reconciliation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    /// Entries dropped because their file is gone
    pub pruned: usize,
    /// Tasks after the rebuild
    pub tasks: usize,
    /// Tasks bound to a live script
    pub bound: usize,
}

/// Prune entries whose file is gone, then rebuild the task list on the
/// UI context.
///
/// Returns `None` if the UI context is gone and the rebuild never ran.
pub async fn reconcile<D>(
    store: &Arc<Mutex<AutostartStore>>,
    registry: &Arc<Mutex<TaskRegistry>>,
    directory: &Arc<D>,
    dispatch: &Arc<dyn UiDispatch>,
) -> Option<ReconcileReport>
where
    D: ScriptDirectory,
{
    let (pruned, entries) = {
        let mut store = store.lock();
        let pruned = store.cleanup_missing(|id| directory.exists(id));
        (pruned, store.entries().to_vec())
    };
    if pruned > 0 {
        tracing::info!(pruned, "pruned autostart entries with missing files");
    }

    let registry = Arc::clone(registry);
    let directory = Arc::clone(directory);
    let (tasks, bound) = invoke(dispatch.as_ref(), move || {
        let mut registry = registry.lock();
        registry.rebuild(&entries, directory.as_ref());
        (registry.len(), registry.bound_count())
    })
    .await?;

    Some(ReconcileReport {
        pruned,
        tasks,
        bound,
    })
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
