//! Auto-save controller.
//!
//! - `engine`: [`AutoSaveCore`], the clock-injected engine: debounce, retry
//!   backoff, local fallback, quota halting, load/recovery
//! - `handle`: [`AutoSaveHandle`], main-thread interface that owns the
//!   worker thread and its channels
//! - `worker`: the thread loop that sleeps until the next deadline or command

mod commands;
mod engine;
mod handle;
mod worker;

pub use engine::AutoSaveCore;
pub use handle::{AutoSaveHandle, AutoSaveReadState, ChangeNotifier};

use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::types::{LoadError, PersistError, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSaveConfig {
    /// When false, changes are tracked but only explicit saves persist them.
    pub enabled: bool,
    /// Quiet period after the last change before a save starts.
    pub idle_interval: Duration,
    /// Longest a stream of changes can postpone a save.
    pub max_wait: Duration,
    pub retry: RetryPolicy,
    /// Key of the fallback record in the local store.
    pub local_key: String,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_interval: Duration::from_millis(1500),
            max_wait: Duration::from_secs(15),
            retry: RetryPolicy::default(),
            local_key: "savepoint.pending".to_string(),
        }
    }
}

/// Result of one save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        revision: u64,
    },
    RetryScheduled {
        revision: u64,
        attempt: u32,
        delay: Duration,
        error: PersistError,
        /// Whether the snapshot was written to the local fallback store.
        fallback_stored: bool,
    },
    /// Out of space. No automatic attempt happens until [`AutoSaveCore::request_save`].
    Halted {
        revision: u64,
        error: PersistError,
    },
}

/// What a load produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Body fetched from the remote target.
    Remote(String),
    /// Unsynced copy from the local fallback store. It is newer than the
    /// remote copy and is pushed on the next change notification.
    Recovered(Snapshot),
    /// Nothing saved anywhere yet.
    Empty,
}

impl LoadOutcome {
    pub fn body(&self) -> Option<&str> {
        match self {
            LoadOutcome::Remote(body) => Some(body),
            LoadOutcome::Recovered(snapshot) => Some(&snapshot.body),
            LoadOutcome::Empty => None,
        }
    }
}

/// Feedback from the worker thread to the owner of the handle.
#[derive(Debug)]
pub enum AutoSaveFeedback {
    SaveComplete(SaveOutcome),
    LoadComplete {
        id: u64,
        result: Result<LoadOutcome, LoadError>,
    },
}
