// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task registry: the observable list of autostart tasks
//!
//! Each task pairs a persisted entry with a weak reference to the live
//! script it names. Tasks are rebuilt from the store in store order and
//! subscribe to their script's change notifications for as long as they
//! are bound.

use autorun_adapters::{HandleChange, ListenerId, ScriptDirectory, ScriptHandle, UiDispatch};
use autorun_core::{AutostartEntry, Clock, ScriptId, TaskStatus};
use autorun_storage::AutostartStore;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// Change to the task list, published to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// The whole list was rebuilt
    Reset,
    Added(ScriptId),
    Removed(ScriptId),
    /// A bound script's status, text, running or compiling state changed
    TaskChanged(ScriptId),
}

/// Subscription of a task to its script. Unsubscribes on drop.
struct Binding {
    handle: Weak<dyn ScriptHandle>,
    listener: ListenerId,
}

impl Drop for Binding {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.upgrade() {
            handle.unsubscribe(self.listener);
        }
    }
}

/// Runtime projection of one autostart entry.
pub struct AutostartTask {
    entry: AutostartEntry,
    binding: Option<Binding>,
}

impl AutostartTask {
    pub fn script_id(&self) -> &ScriptId {
        &self.entry.script_id
    }

    pub fn entry(&self) -> &AutostartEntry {
        &self.entry
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.entry.added_at
    }

    /// The live script, if still bound and alive
    pub fn handle(&self) -> Option<Arc<dyn ScriptHandle>> {
        self.binding.as_ref()?.handle.upgrade()
    }

    pub fn is_bound(&self) -> bool {
        self.handle().is_some()
    }

    /// Display name, falling back to the file stem when unbound
    pub fn name(&self) -> String {
        match self.handle() {
            Some(handle) => handle.name(),
            None => self.entry.script_id.file_stem().to_string(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        let state = self.handle().map(|h| h.state());
        TaskStatus::derive(state.as_ref())
    }

    /// Bound to a script that is saved to disk
    pub fn is_valid(&self) -> bool {
        self.handle().is_some_and(|h| h.is_saved_to_disk())
    }

    pub fn is_running(&self) -> bool {
        self.handle().is_some_and(|h| h.is_running())
    }
}

impl std::fmt::Debug for AutostartTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutostartTask")
            .field("script_id", &self.entry.script_id)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Ordered list of autostart tasks, mirroring the store.
pub struct TaskRegistry {
    tasks: Vec<Arc<AutostartTask>>,
    events: broadcast::Sender<RegistryEvent>,
    dispatch: Arc<dyn UiDispatch>,
}

impl TaskRegistry {
    /// Change notifications from scripts are delivered through `dispatch`.
    pub fn new(dispatch: Arc<dyn UiDispatch>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tasks: Vec::new(),
            events,
            dispatch,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current tasks, in order
    pub fn tasks(&self) -> Vec<Arc<AutostartTask>> {
        self.tasks.clone()
    }

    pub fn find(&self, script_id: &str) -> Option<Arc<AutostartTask>> {
        self.tasks
            .iter()
            .find(|t| t.script_id().matches(script_id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks bound to a live script
    pub fn bound_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_bound()).count()
    }

    /// Replace every task with one per entry, in entry order.
    pub fn rebuild<D>(&mut self, entries: &[AutostartEntry], directory: &D)
    where
        D: ScriptDirectory + ?Sized,
    {
        let tasks = entries
            .iter()
            .map(|entry| Arc::new(self.bind(entry.clone(), directory)))
            .collect();
        // Old tasks drop here, releasing their subscriptions
        self.tasks = tasks;
        tracing::debug!(tasks = self.tasks.len(), "task list rebuilt");
        let _ = self.events.send(RegistryEvent::Reset);
    }

    /// Add `script_id` to the store and append its task.
    ///
    /// Returns false if it was already enabled.
    pub fn enable<D, C>(
        &mut self,
        store: &mut AutostartStore,
        script_id: &ScriptId,
        directory: &D,
        clock: &C,
    ) -> bool
    where
        D: ScriptDirectory + ?Sized,
        C: Clock,
    {
        if !store.add(script_id.clone(), clock) {
            return false;
        }
        let Some(entry) = store.get(script_id.as_str()).cloned() else {
            return false;
        };
        if self.find(script_id.as_str()).is_none() {
            let task = self.bind(entry, directory);
            self.tasks.push(Arc::new(task));
            let _ = self.events.send(RegistryEvent::Added(script_id.clone()));
        }
        tracing::info!(script = %script_id, "autostart enabled");
        true
    }

    /// Remove `script_id` from the store and drop its task.
    ///
    /// Returns false if it was not enabled.
    pub fn disable(&mut self, store: &mut AutostartStore, script_id: &ScriptId) -> bool {
        let removed = store.remove(script_id.as_str());
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.script_id().matches(script_id.as_str()));
        let dropped = before - self.tasks.len();
        if removed == 0 && dropped == 0 {
            return false;
        }
        let _ = self.events.send(RegistryEvent::Removed(script_id.clone()));
        tracing::info!(script = %script_id, "autostart disabled");
        true
    }

    fn bind<D>(&self, entry: AutostartEntry, directory: &D) -> AutostartTask
    where
        D: ScriptDirectory + ?Sized,
    {
        let binding = directory.resolve(&entry.script_id).map(|handle| {
            let listener = handle.subscribe(self.forwarder(entry.script_id.clone()));
            Binding {
                handle: Arc::downgrade(&handle),
                listener,
            }
        });
        if binding.is_none() {
            tracing::debug!(script = %entry.script_id, "no live script, task unbound");
        }
        AutostartTask { entry, binding }
    }

    /// Listener that republishes relevant changes on the UI context
    fn forwarder(&self, script_id: ScriptId) -> autorun_adapters::ChangeListener {
        let events = self.events.clone();
        let dispatch = Arc::clone(&self.dispatch);
        Arc::new(move |change| {
            if !matches!(
                change,
                HandleChange::Status
                    | HandleChange::StatusText
                    | HandleChange::Running
                    | HandleChange::Compiling
            ) {
                return;
            }
            let events = events.clone();
            let script_id = script_id.clone();
            dispatch.post(Box::new(move || {
                let _ = events.send(RegistryEvent::TaskChanged(script_id));
            }));
        })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
