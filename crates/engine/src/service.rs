// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Autostart service: owns the store and task list and reacts to sessions
//!
//! A `Connected` event starts a pass: wait for the session to settle,
//! reconcile the store against the scripts on disk, then start every
//! eligible task. Only one pass is in flight at a time; a newer connect
//! or a disconnect aborts the current one.

use crate::config::{AutostartConfig, Delays};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::registry::{AutostartTask, RegistryEvent, TaskRegistry};
use crate::scheduler::{run_pass, PassReport};
use autorun_adapters::{invoke, ScriptDirectory, ScriptHost, UiDispatch};
use autorun_core::{Clock, IdGen, PassId, ScriptId, SessionEvent, UuidIdGen};
use autorun_storage::AutostartStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::Instrument;

/// Service adapter dependencies
pub struct AutostartDeps<D, H, I = UuidIdGen> {
    pub directory: D,
    pub host: H,
    pub dispatch: Arc<dyn UiDispatch>,
    pub ids: I,
}

struct ActivePass {
    id: PassId,
    abort: AbortHandle,
}

impl ActivePass {
    fn abort(self) {
        if !self.abort.is_finished() {
            tracing::info!(pass = %self.id, "aborting in-flight pass");
        }
        self.abort.abort();
    }
}

pub(crate) struct Inner<D, H, C, I> {
    pub(crate) store: Arc<Mutex<AutostartStore>>,
    pub(crate) registry: Arc<Mutex<TaskRegistry>>,
    pub(crate) directory: Arc<D>,
    pub(crate) host: H,
    pub(crate) dispatch: Arc<dyn UiDispatch>,
    pub(crate) clock: C,
    pub(crate) delays: Delays,
    ids: I,
    pass: Mutex<Option<ActivePass>>,
}

/// Autostart scheduling for one host application.
///
/// Cheap to clone; clones share state.
pub struct AutostartService<D, H, C, I = UuidIdGen> {
    pub(crate) inner: Arc<Inner<D, H, C, I>>,
}

impl<D, H, C, I> Clone for AutostartService<D, H, C, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D, H, C, I> AutostartService<D, H, C, I>
where
    D: ScriptDirectory,
    H: ScriptHost,
    C: Clock,
    I: IdGen,
{
    /// Load the store and build an empty task list.
    ///
    /// Call [`initialize`](Self::initialize) once the script directory is
    /// populated to bind tasks.
    pub fn new(config: AutostartConfig, deps: AutostartDeps<D, H, I>, clock: C) -> Self {
        let store = AutostartStore::load(&config.store_path);
        let registry = TaskRegistry::new(Arc::clone(&deps.dispatch));
        Self {
            inner: Arc::new(Inner {
                store: Arc::new(Mutex::new(store)),
                registry: Arc::new(Mutex::new(registry)),
                directory: Arc::new(deps.directory),
                host: deps.host,
                dispatch: deps.dispatch,
                clock,
                delays: config.delays,
                ids: deps.ids,
                pass: Mutex::new(None),
            }),
        }
    }

    pub fn directory(&self) -> &D {
        &self.inner.directory
    }

    pub fn delays(&self) -> Delays {
        self.inner.delays
    }

    /// Prune missing files and bind tasks, without starting anything.
    pub async fn initialize(&self) -> Option<ReconcileReport> {
        let inner = &self.inner;
        let report =
            reconcile(&inner.store, &inner.registry, &inner.directory, &inner.dispatch).await;
        match &report {
            Some(r) => tracing::info!(
                pruned = r.pruned,
                tasks = r.tasks,
                bound = r.bound,
                "autostart initialized"
            ),
            None => tracing::warn!("ui context closed before autostart initialized"),
        }
        report
    }

    /// React to a session event.
    ///
    /// `Connected` returns the handle of the pass it started.
    pub fn handle_event(&self, event: SessionEvent) -> Option<JoinHandle<Option<PassReport>>> {
        tracing::info!(event = event.name(), "session event");
        match event {
            SessionEvent::Connected => Some(self.start_pass()),
            SessionEvent::Disconnected => {
                self.abort_pass();
                None
            }
        }
    }

    /// Handle session events until the sender side is dropped.
    pub async fn run(&self, mut events: mpsc::Receiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            let _ = self.handle_event(event);
        }
        tracing::debug!("session event source closed");
        self.abort_pass();
    }

    pub fn is_autostart(&self, script_id: &str) -> bool {
        self.inner.store.lock().contains(script_id)
    }

    /// Turn autostart on or off for `script_id`.
    ///
    /// Returns true if anything changed.
    pub async fn set_autostart(&self, script_id: impl Into<ScriptId>, enabled: bool) -> bool {
        let script_id = script_id.into();
        let inner = Arc::clone(&self.inner);
        invoke(self.inner.dispatch.as_ref(), move || {
            let mut registry = inner.registry.lock();
            let mut store = inner.store.lock();
            if enabled {
                registry.enable(&mut store, &script_id, inner.directory.as_ref(), &inner.clock)
            } else {
                registry.disable(&mut store, &script_id)
            }
        })
        .await
        .unwrap_or(false)
    }

    /// Snapshot of the task list, in execution order
    pub fn tasks(&self) -> Vec<Arc<AutostartTask>> {
        self.inner.registry.lock().tasks()
    }

    pub fn find(&self, script_id: &str) -> Option<Arc<AutostartTask>> {
        self.inner.registry.lock().find(script_id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.inner.registry.lock().subscribe()
    }

    /// Ids of persisted entries, in order
    pub fn entries(&self) -> Vec<ScriptId> {
        self.inner
            .store
            .lock()
            .entries()
            .iter()
            .map(|e| e.script_id.clone())
            .collect()
    }

    /// Abort any in-flight pass and cancel running tasks.
    ///
    /// Returns how many tasks were asked to cancel.
    pub fn shutdown(&self) -> usize {
        self.abort_pass();
        let mut cancelled = 0;
        for task in self.tasks() {
            if let Some(handle) = task.handle().filter(|h| h.is_running()) {
                handle.cancel();
                cancelled += 1;
            }
        }
        tracing::info!(cancelled, "autostart service shut down");
        cancelled
    }

    fn start_pass(&self) -> JoinHandle<Option<PassReport>> {
        // Held until the new pass is stored so concurrent connects serialize
        let mut slot = self.inner.pass.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let id = PassId::new(self.inner.ids.next());
        let span = tracing::info_span!("pass", id = %id.short(8));
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(inner.connect_pass().instrument(span));

        *slot = Some(ActivePass {
            id,
            abort: handle.abort_handle(),
        });
        handle
    }

    fn abort_pass(&self) {
        if let Some(pass) = self.inner.pass.lock().take() {
            pass.abort();
        }
    }
}

impl<D, H, C, I> Inner<D, H, C, I>
where
    D: ScriptDirectory,
    H: ScriptHost,
    C: Clock,
    I: IdGen,
{
    async fn connect_pass(self: Arc<Self>) -> Option<PassReport> {
        tokio::time::sleep(self.delays.settle).await;

        let reconciled =
            reconcile(&self.store, &self.registry, &self.directory, &self.dispatch).await;
        let Some(reconciled) = reconciled else {
            tracing::warn!("ui context closed, skipping pass");
            return None;
        };
        tracing::info!(
            pruned = reconciled.pruned,
            tasks = reconciled.tasks,
            bound = reconciled.bound,
            "reconciled"
        );

        let snapshot = self.registry.lock().tasks();
        let report = run_pass(&snapshot, self.delays.inter_task).await;
        tracing::info!(
            started = report.started.len(),
            skipped = report.skipped(),
            load_failed = report.load_failed.len(),
            "pass complete"
        );
        Some(report)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
pub(crate) mod tests;
