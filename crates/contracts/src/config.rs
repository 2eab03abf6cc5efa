//! Dispatcher configuration contracts shared by the loader and the dispatcher.

use serde::{Deserialize, Serialize};

/// How matched handlers are run during an emission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    /// Each handler is launched as a blocking task on a tokio runtime.
    /// `emit` returns once every matched handler has been launched.
    #[default]
    Detached,
    /// Handlers run one after another on the emitting thread, with the
    /// registry lock released for the duration of each call.
    Synchronous,
}

/// Dispatcher configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Handler invocation policy
    #[serde(default)]
    pub invocation: InvocationMode,

    /// Log a warning when one event key accumulates more listeners than this.
    /// Registration is never refused.
    #[serde(default)]
    pub listener_warn_threshold: Option<usize>,
}

impl DispatcherConfig {
    /// Configuration for synchronous invocation with no warning threshold
    pub fn synchronous() -> Self {
        Self {
            invocation: InvocationMode::Synchronous,
            ..Default::default()
        }
    }
}
