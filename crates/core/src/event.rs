// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle events consumed by the autostart service.

use serde::{Deserialize, Serialize};

/// Signal from the connection-event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A session was established; emitted once per connection.
    Connected,
    /// The session went away.
    Disconnected,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected => "session:connected",
            Self::Disconnected => "session:disconnected",
        }
    }
}

/// Identifies one scheduling pass in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassId(String);

impl PassId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// At most the first `n` characters, for compact log fields
    pub fn short(&self, n: usize) -> &str {
        match self.0.char_indices().nth(n) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for PassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
