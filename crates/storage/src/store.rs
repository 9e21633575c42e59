// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted set of scripts marked for autostart.
//!
//! The store is the durable record of intent: "run this script when a
//! session connects". It is a convenience layer, so nothing here is allowed
//! to stop the host from starting. Unreadable files load as an empty store,
//! and failed writes are logged and reported as a [`SaveOutcome`] rather
//! than an error.

use autorun_core::{AutostartEntry, Clock, ScriptId};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while reading or writing the store file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a best-effort write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed(String),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    #[serde(default)]
    entries: Vec<AutostartEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocumentRef<'a> {
    entries: &'a [AutostartEntry],
}

/// Ordered autostart entries backed by a JSON file.
///
/// Insertion order is execution order. No two entries share a script id.
#[derive(Debug)]
pub struct AutostartStore {
    path: PathBuf,
    entries: Vec<AutostartEntry>,
}

impl AutostartStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. A corrupt file is moved to a
    /// `.bak` file and also yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_document(&path) {
            Ok(Some(doc)) => dedupe(doc.entries),
            Ok(None) => Vec::new(),
            Err(StoreError::Json(e)) => {
                let bak_path = rotate_bak_path(&path);
                warn!(
                    error = %e,
                    path = %path.display(),
                    bak = %bak_path.display(),
                    "Corrupt autostart file, moving to .bak and starting empty",
                );
                if let Err(e) = fs::rename(&path, &bak_path) {
                    warn!(error = %e, "failed to move corrupt autostart file aside");
                }
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to read autostart file");
                Vec::new()
            }
        };
        debug!(path = %path.display(), count = entries.len(), "autostart store loaded");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[AutostartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, script_id: &str) -> bool {
        self.get(script_id).is_some()
    }

    pub fn get(&self, script_id: &str) -> Option<&AutostartEntry> {
        self.entries.iter().find(|e| e.script_id.matches(script_id))
    }

    /// Append `script_id` stamped with the clock's time and persist.
    ///
    /// Returns false (and writes nothing) if it is already present.
    pub fn add(&mut self, script_id: impl Into<ScriptId>, clock: &impl Clock) -> bool {
        let script_id = script_id.into();
        if self.contains(script_id.as_str()) {
            return false;
        }
        self.entries.push(AutostartEntry::new(script_id, clock.now()));
        self.save();
        true
    }

    /// Remove every entry matching `script_id`, persisting if any were removed.
    pub fn remove(&mut self, script_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.script_id.matches(script_id));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.save();
        }
        removed
    }

    /// Drop entries whose backing file no longer exists.
    ///
    /// Persists only when something was removed, so running it again with
    /// no file-system change is a no-op.
    pub fn cleanup_missing(&mut self, exists: impl Fn(&ScriptId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| {
            let keep = exists(&e.script_id);
            if !keep {
                debug!(script = %e.script_id, "pruning autostart entry for missing file");
            }
            keep
        });
        let removed = before - self.entries.len();
        if removed > 0 {
            self.save();
        }
        removed
    }

    /// Write the store, logging instead of failing.
    pub fn save(&self) -> SaveOutcome {
        match self.try_save() {
            Ok(()) => SaveOutcome::Saved,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to save autostart file");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Write the store atomically (write to .tmp, then rename).
    pub fn try_save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            let doc = StoreDocumentRef {
                entries: &self.entries,
            };
            serde_json::to_writer_pretty(&mut writer, &doc)?;
            writer.write_all(b"\n")?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<Option<StoreDocument>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    let doc = serde_json::from_str(&text)?;
    Ok(Some(doc))
}

/// Keep the first entry for each script id; hand-edited files may repeat one.
fn dedupe(entries: Vec<AutostartEntry>) -> Vec<AutostartEntry> {
    let mut kept: Vec<AutostartEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if kept.iter().any(|k| k.script_id == entry.script_id) {
            warn!(script = %entry.script_id, "dropping duplicate autostart entry");
            continue;
        }
        kept.push(entry);
    }
    kept
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
