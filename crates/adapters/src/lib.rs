// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the script engine, the host and the UI context

pub mod dispatch;
pub mod host;
pub mod script;
pub mod traced;

pub use dispatch::{invoke, ChannelDispatch, InlineDispatch, UiDispatch, UiJob};
pub use host::SessionHost;
pub use script::{
    ChangeListener, FsScriptDirectory, HandleChange, ListenerId, Listeners, ProcessScript,
    ProcessScriptConfig, ScriptDirectory, ScriptError, ScriptHandle, ScriptHost,
};
pub use traced::TracedDirectory;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use dispatch::ManualDispatch;
#[cfg(any(test, feature = "test-support"))]
pub use script::{FakeHost, FakeScript, FakeScriptDirectory, ScriptCall};
