// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted autostart record.

use crate::ScriptId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A script marked to run automatically when a session connects.
///
/// Identity is the script id (case-insensitive). Entries are never edited
/// in place; turning autostart off removes the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutostartEntry {
    #[serde(rename = "fileName")]
    pub script_id: ScriptId,
    pub added_at: DateTime<Utc>,
}

impl AutostartEntry {
    pub fn new(script_id: impl Into<ScriptId>, added_at: DateTime<Utc>) -> Self {
        Self {
            script_id: script_id.into(),
            added_at,
        }
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
