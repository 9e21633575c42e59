// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script engine adapters
//!
//! The autostart engine never compiles or runs scripts itself. It talks to
//! live scripts through [`ScriptHandle`], finds them through
//! [`ScriptDirectory`], and asks [`ScriptHost`] whether execution is allowed.

mod fs;
mod listeners;
mod process;

pub use fs::FsScriptDirectory;
pub use listeners::Listeners;
pub use process::{ProcessScript, ProcessScriptConfig};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHost, FakeScript, FakeScriptDirectory, ScriptCall};

use async_trait::async_trait;
use autorun_core::{HandleState, ScriptId, ScriptStatus};
use std::sync::Arc;
use thiserror::Error;

/// Errors from script operations
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script not found: {0}")]
    NotFound(String),
    #[error("load failed: {0}")]
    LoadFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which observable property of a script changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleChange {
    Status,
    StatusText,
    Running,
    Compiling,
    Loaded,
    /// The script's autostart flag was toggled elsewhere.
    Autostart,
}

/// Token returned by [`ScriptHandle::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked on every property change of a script.
pub type ChangeListener = Arc<dyn Fn(HandleChange) + Send + Sync>;

/// A live script object owned by the script engine.
#[async_trait]
pub trait ScriptHandle: Send + Sync + 'static {
    fn script_id(&self) -> &ScriptId;

    /// Display name
    fn name(&self) -> String;

    fn status(&self) -> ScriptStatus;

    fn status_text(&self) -> String;

    fn is_running(&self) -> bool;

    fn is_compiling(&self) -> bool;

    fn is_loaded(&self) -> bool;

    /// True if the script is backed by a saved file
    fn is_saved_to_disk(&self) -> bool;

    /// Read and compile the script
    async fn load(&self) -> Result<(), ScriptError>;

    /// Start executing. Returns immediately.
    fn execute(&self);

    /// Request cancellation. Returns immediately; teardown is asynchronous.
    fn cancel(&self);

    fn subscribe(&self, listener: ChangeListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);

    /// Tell observers the autostart flag for this script changed.
    fn notify_autostart_changed(&self);

    /// Snapshot of the fields a task status is derived from.
    fn state(&self) -> HandleState {
        HandleState {
            status: self.status(),
            status_text: self.status_text(),
            is_running: self.is_running(),
            is_compiling: self.is_compiling(),
        }
    }
}

/// Lookup of scripts by id.
///
/// The directory owns the live handles; callers that keep one around
/// should hold it weakly.
pub trait ScriptDirectory: Send + Sync + 'static {
    /// True if a backing file exists for `id`
    fn exists(&self, id: &ScriptId) -> bool;

    /// The live handle for `id`, if one is registered
    fn resolve(&self, id: &ScriptId) -> Option<Arc<dyn ScriptHandle>>;
}

/// The application hosting script execution.
pub trait ScriptHost: Send + Sync + 'static {
    /// False while scripts may not be started (e.g. no session)
    fn can_execute(&self) -> bool;
}

impl<T: ScriptDirectory + ?Sized> ScriptDirectory for Arc<T> {
    fn exists(&self, id: &ScriptId) -> bool {
        (**self).exists(id)
    }

    fn resolve(&self, id: &ScriptId) -> Option<Arc<dyn ScriptHandle>> {
        (**self).resolve(id)
    }
}

impl<T: ScriptHost + ?Sized> ScriptHost for Arc<T> {
    fn can_execute(&self) -> bool {
        (**self).can_execute()
    }
}
