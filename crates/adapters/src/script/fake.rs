// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake script engine for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    ChangeListener, HandleChange, ListenerId, Listeners, ScriptDirectory, ScriptError,
    ScriptHandle, ScriptHost,
};
use async_trait::async_trait;
use autorun_core::{ScriptId, ScriptStatus};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Recorded script call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCall {
    Load { id: String },
    Execute { id: String },
    Cancel { id: String },
    AutostartChanged { id: String },
}

impl ScriptCall {
    pub fn id(&self) -> &str {
        match self {
            Self::Load { id }
            | Self::Execute { id }
            | Self::Cancel { id }
            | Self::AutostartChanged { id } => id,
        }
    }
}

type CallLog = Arc<Mutex<Vec<ScriptCall>>>;

#[derive(Debug, Clone)]
struct FakeScriptState {
    status: ScriptStatus,
    status_text: String,
    running: bool,
    compiling: bool,
    loaded: bool,
    saved: bool,
    fail_load: bool,
    run_on_execute: bool,
}

impl Default for FakeScriptState {
    fn default() -> Self {
        Self {
            status: ScriptStatus::None,
            status_text: String::new(),
            running: false,
            compiling: false,
            loaded: false,
            saved: true,
            fail_load: false,
            run_on_execute: true,
        }
    }
}

/// Fake live script. Saved to disk and not loaded by default.
pub struct FakeScript {
    id: ScriptId,
    state: Mutex<FakeScriptState>,
    listeners: Listeners,
    calls: CallLog,
}

impl FakeScript {
    pub fn new(id: impl Into<ScriptId>) -> Arc<Self> {
        Self::with_log(id.into(), Arc::new(Mutex::new(Vec::new())))
    }

    fn with_log(id: ScriptId, calls: CallLog) -> Arc<Self> {
        Arc::new(Self {
            id,
            state: Mutex::new(FakeScriptState::default()),
            listeners: Listeners::new(),
            calls,
        })
    }

    /// Calls recorded on this script's log
    pub fn calls(&self) -> Vec<ScriptCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| self.id.matches(c.id()))
            .cloned()
            .collect()
    }

    pub fn execute_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ScriptCall::Execute { .. }))
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn set_running(&self, running: bool) {
        {
            let mut state = self.state.lock();
            state.running = running;
            if running {
                state.status = ScriptStatus::Running;
            }
        }
        self.listeners.emit(HandleChange::Running);
    }

    pub fn set_compiling(&self, compiling: bool) {
        self.state.lock().compiling = compiling;
        self.listeners.emit(HandleChange::Compiling);
    }

    pub fn set_status(&self, status: ScriptStatus, text: &str) {
        {
            let mut state = self.state.lock();
            state.status = status;
            state.status_text = text.to_string();
        }
        self.listeners.emit(HandleChange::Status);
    }

    pub fn set_saved(&self, saved: bool) {
        self.state.lock().saved = saved;
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.state.lock().loaded = loaded;
    }

    /// Make `load()` fail
    pub fn fail_load(&self, fail: bool) {
        self.state.lock().fail_load = fail;
    }

    /// Whether `execute()` flips the script into the running state
    pub fn run_on_execute(&self, run: bool) {
        self.state.lock().run_on_execute = run;
    }
}

#[async_trait]
impl ScriptHandle for FakeScript {
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
        self.state.lock().saved
    }

    async fn load(&self) -> Result<(), ScriptError> {
        self.calls.lock().push(ScriptCall::Load {
            id: self.id.to_string(),
        });
        let mut state = self.state.lock();
        if state.fail_load {
            return Err(ScriptError::LoadFailed(format!(
                "{}: syntax error",
                self.id
            )));
        }
        state.loaded = true;
        Ok(())
    }

    fn execute(&self) {
        self.calls.lock().push(ScriptCall::Execute {
            id: self.id.to_string(),
        });
        let run = {
            let mut state = self.state.lock();
            if state.run_on_execute {
                state.running = true;
                state.status = ScriptStatus::Running;
            }
            state.run_on_execute
        };
        if run {
            self.listeners.emit(HandleChange::Running);
        }
    }

    fn cancel(&self) {
        self.calls.lock().push(ScriptCall::Cancel {
            id: self.id.to_string(),
        });
        {
            let mut state = self.state.lock();
            state.running = false;
            state.status = ScriptStatus::Canceled;
            state.status_text = "canceled".to_string();
        }
        self.listeners.emit(HandleChange::Running);
    }

    fn subscribe(&self, listener: ChangeListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.remove(id);
    }

    fn notify_autostart_changed(&self) {
        self.calls.lock().push(ScriptCall::AutostartChanged {
            id: self.id.to_string(),
        });
        self.listeners.emit(HandleChange::Autostart);
    }
}

struct FakeDirectoryState {
    files: HashSet<ScriptId>,
    handles: HashMap<ScriptId, Arc<FakeScript>>,
}

/// Fake script directory. Scripts created through it share one call log,
/// so cross-script ordering can be asserted.
#[derive(Clone)]
pub struct FakeScriptDirectory {
    inner: Arc<Mutex<FakeDirectoryState>>,
    calls: CallLog,
}

impl Default for FakeScriptDirectory {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeDirectoryState {
                files: HashSet::new(),
                handles: HashMap::new(),
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeScriptDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with a live handle
    pub fn add_script(&self, id: &str) -> Arc<FakeScript> {
        let script = FakeScript::with_log(ScriptId::new(id), Arc::clone(&self.calls));
        let mut inner = self.inner.lock();
        inner.files.insert(ScriptId::new(id));
        inner.handles.insert(ScriptId::new(id), Arc::clone(&script));
        script
    }

    /// Add a file that has no live handle
    pub fn add_file(&self, id: &str) {
        self.inner.lock().files.insert(ScriptId::new(id));
    }

    /// Delete the file and drop the directory's handle
    pub fn delete(&self, id: &str) {
        let mut inner = self.inner.lock();
        inner.files.remove(&ScriptId::new(id));
        inner.handles.remove(&ScriptId::new(id));
    }

    /// Drop the directory's handle but keep the file
    pub fn drop_handle(&self, id: &str) {
        self.inner.lock().handles.remove(&ScriptId::new(id));
    }

    /// All calls across scripts, in order
    pub fn calls(&self) -> Vec<ScriptCall> {
        self.calls.lock().clone()
    }

    /// Ids of scripts that were executed, in order
    pub fn executed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ScriptCall::Execute { id } => Some(id),
                _ => None,
            })
            .collect()
    }
}

impl ScriptDirectory for FakeScriptDirectory {
    fn exists(&self, id: &ScriptId) -> bool {
        self.inner.lock().files.contains(id)
    }

    fn resolve(&self, id: &ScriptId) -> Option<Arc<dyn ScriptHandle>> {
        let handle: Arc<dyn ScriptHandle> = self.inner.lock().handles.get(id).cloned()?;
        Some(handle)
    }
}

/// Fake host. Execution is allowed by default.
#[derive(Clone)]
pub struct FakeHost {
    can_execute: Arc<AtomicBool>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            can_execute: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_can_execute(&self, can: bool) {
        self.can_execute.store(can, Ordering::SeqCst);
    }
}

impl ScriptHost for FakeHost {
    fn can_execute(&self) -> bool {
        self.can_execute.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
