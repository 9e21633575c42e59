// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration

use std::path::PathBuf;
use std::time::Duration;

/// Waits that let asynchronous setup and teardown finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    /// Between a session connecting and reconciliation
    pub settle: Duration,
    /// Between starting one task and the next in a pass
    pub inter_task: Duration,
    /// Between cancelling a task and starting it again
    pub restart_settle: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            inter_task: Duration::from_millis(100),
            restart_settle: Duration::from_millis(100),
        }
    }
}

impl Delays {
    /// All delays zero.
    pub fn none() -> Self {
        Self {
            settle: Duration::ZERO,
            inter_task: Duration::ZERO,
            restart_settle: Duration::ZERO,
        }
    }
}

/// Autostart service configuration
#[derive(Debug, Clone)]
pub struct AutostartConfig {
    /// Location of the persisted autostart list
    pub store_path: PathBuf,
    pub delays: Delays,
}

impl AutostartConfig {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            delays: Delays::default(),
        }
    }

    pub fn with_delays(mut self, delays: Delays) -> Self {
        self.delays = delays;
        self
    }
}
