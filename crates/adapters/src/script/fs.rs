// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-system backed script directory

use super::{ScriptDirectory, ScriptHandle};
use autorun_core::ScriptId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Scripts stored as files directly under one root directory.
///
/// Existence is answered from the file system; live handles are whatever
/// the host registered. File names match case-insensitively.
pub struct FsScriptDirectory {
    root: PathBuf,
    handles: RwLock<HashMap<ScriptId, Arc<dyn ScriptHandle>>>,
}

impl FsScriptDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `id` to a file under the root, if one exists.
    pub fn file_path(&self, id: &ScriptId) -> Option<PathBuf> {
        if !is_plain_file_name(id.as_str()) {
            return None;
        }
        let direct = self.root.join(id.as_str());
        if direct.is_file() {
            return Some(direct);
        }
        // Case-sensitive file systems need a scan to honor case-insensitive ids
        fs::read_dir(&self.root)
            .ok()?
            .flatten()
            .map(|e| e.path())
            .find(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| id.matches(n))
            })
    }

    /// Ids of every visible file under the root, sorted by name.
    pub fn list(&self) -> Vec<ScriptId> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut ids: Vec<ScriptId> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| !n.starts_with('.'))
            .map(ScriptId::from)
            .collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    /// Register a live handle, replacing any previous one for the same id.
    pub fn register(&self, handle: Arc<dyn ScriptHandle>) {
        let id = handle.script_id().clone();
        self.handles.write().insert(id, handle);
    }

    pub fn unregister(&self, id: &ScriptId) -> Option<Arc<dyn ScriptHandle>> {
        self.handles.write().remove(id)
    }

    /// Live handles, in no particular order.
    pub fn handles(&self) -> Vec<Arc<dyn ScriptHandle>> {
        self.handles.read().values().cloned().collect()
    }
}

impl ScriptDirectory for FsScriptDirectory {
    fn exists(&self, id: &ScriptId) -> bool {
        self.file_path(id).is_some()
    }

    fn resolve(&self, id: &ScriptId) -> Option<Arc<dyn ScriptHandle>> {
        self.handles.read().get(id).cloned()
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
