// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script identifier type.
//!
//! A ScriptId is the file name of a script inside the scripts directory.
//! Scripts are looked up the way the host file system treats names on the
//! desktop: `Foo.lua` and `foo.LUA` are the same script. The spelling the
//! user first chose is kept for display and persistence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Case-insensitive identifier of a script file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(String);

impl ScriptId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `other` names the same script, ignoring case.
    pub fn matches(&self, other: &str) -> bool {
        fold(&self.0).eq(fold(other))
    }

    /// File name without its extension, used when no live script supplies a name.
    pub fn file_stem(&self) -> &str {
        Path::new(&self.0)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.0)
    }
}

fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

impl PartialEq for ScriptId {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for ScriptId {}

impl Hash for ScriptId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in fold(&self.0) {
            c.hash(state);
        }
        // terminator keeps "ab"+"c" distinct from "a"+"bc" in composite keys
        state.write_u8(0xff);
    }
}

impl PartialEq<str> for ScriptId {
    fn eq(&self, other: &str) -> bool {
        self.matches(other)
    }
}

impl PartialEq<&str> for ScriptId {
    fn eq(&self, other: &&str) -> bool {
        self.matches(other)
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ScriptId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ScriptId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
#[path = "script_id_tests.rs"]
mod tests;
