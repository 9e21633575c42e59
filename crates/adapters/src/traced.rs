// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::script::{ScriptDirectory, ScriptHandle};
use autorun_core::ScriptId;
use std::sync::Arc;

/// Wrapper that adds tracing to any ScriptDirectory
#[derive(Clone)]
pub struct TracedDirectory<D> {
    inner: D,
}

impl<D> TracedDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: ScriptDirectory> ScriptDirectory for TracedDirectory<D> {
    fn exists(&self, id: &ScriptId) -> bool {
        let exists = self.inner.exists(id);
        tracing::trace!(script = %id, exists, "checked");
        if !exists {
            tracing::debug!(script = %id, "script file missing");
        }
        exists
    }

    fn resolve(&self, id: &ScriptId) -> Option<Arc<dyn ScriptHandle>> {
        let handle = self.inner.resolve(id);
        tracing::info_span!("directory.resolve", script = %id).in_scope(|| match &handle {
            Some(h) => tracing::trace!(name = %h.name(), "resolved"),
            None => tracing::debug!("no live script"),
        });
        handle
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
