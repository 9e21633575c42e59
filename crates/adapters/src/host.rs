// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-gated script host

use crate::script::ScriptHost;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Allows execution only while a session is connected.
#[derive(Debug, Clone, Default)]
pub struct SessionHost {
    connected: Arc<AtomicBool>,
}

impl SessionHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl ScriptHost for SessionHost {
    fn can_execute(&self) -> bool {
        self.is_connected()
    }
}
