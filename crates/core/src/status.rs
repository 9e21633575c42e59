// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script and task status types.
//!
//! `ScriptStatus` is what the script engine reports for a live script.
//! `TaskStatus` is what an autostart task shows, derived from the live
//! script (if any) every time it is read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last known outcome reported by the script engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStatus {
    /// Never compiled or executed in this process.
    #[default]
    None,
    Compiling,
    CompileError,
    Running,
    Complete,
    Canceled,
    Faulted,
}

/// Point-in-time view of a live script, enough to derive a [`TaskStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandleState {
    pub status: ScriptStatus,
    pub status_text: String,
    pub is_running: bool,
    pub is_compiling: bool,
}

/// Status shown for an autostart task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// No live script is bound (the file is gone or not registered).
    Missing,
    Running,
    Compiling,
    /// Bound, but the script has not reported anything yet.
    Waiting,
    /// Free-text status from the script engine.
    Other(String),
}

impl TaskStatus {
    /// Precedence: missing, running, compiling, waiting, then free text.
    pub fn derive(state: Option<&HandleState>) -> Self {
        let Some(state) = state else {
            return Self::Missing;
        };
        if state.is_running {
            Self::Running
        } else if state.is_compiling {
            Self::Compiling
        } else if state.status == ScriptStatus::None {
            Self::Waiting
        } else {
            Self::Other(state.status_text.clone())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "file missing"),
            Self::Running => write!(f, "running..."),
            Self::Compiling => write!(f, "compiling..."),
            Self::Waiting => write!(f, "waiting"),
            Self::Other(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
