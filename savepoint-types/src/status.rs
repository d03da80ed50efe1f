//! Status vocabulary shown to the user while saving and loading.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The closed set of human-readable status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Ready,
    Loading,
    Saving,
    ChangesSaved,
    SaveFailedWillRetry,
    /// Local fallback (or remote) rejected the write for lack of space.
    StorageFull,
    FailedToLoad,
    AutoSaveInitialized,
}

impl Status {
    pub fn text(self) -> &'static str {
        match self {
            Status::Ready => "Ready",
            Status::Loading => "Loading...",
            Status::Saving => "Saving...",
            Status::ChangesSaved => "Changes saved",
            Status::SaveFailedWillRetry => "Save failed (will retry)",
            Status::StorageFull => "Save failed (storage full)",
            Status::FailedToLoad => "Failed to load data",
            Status::AutoSaveInitialized => "Auto-save initialized",
        }
    }

    pub fn level(self) -> StatusLevel {
        match self {
            Status::SaveFailedWillRetry => StatusLevel::Warning,
            Status::StorageFull | Status::FailedToLoad => StatusLevel::Error,
            _ => StatusLevel::Info,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Phase of the save/load workflow. Written only by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SaveState {
    #[default]
    Idle,
    Loading,
    Saving,
    Saved,
    SaveFailed,
    LoadFailed,
}

/// One notification delivered to status subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent {
    pub status: Status,
    pub state: SaveState,
    pub timestamp: Instant,
}

impl StatusEvent {
    pub fn new(status: Status, state: SaveState) -> Self {
        Self {
            status,
            state,
            timestamp: Instant::now(),
        }
    }

    pub fn text(&self) -> &'static str {
        self.status.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_are_fixed() {
        assert_eq!(Status::Ready.text(), "Ready");
        assert_eq!(Status::Loading.text(), "Loading...");
        assert_eq!(Status::Saving.text(), "Saving...");
        assert_eq!(Status::ChangesSaved.text(), "Changes saved");
        assert_eq!(Status::SaveFailedWillRetry.text(), "Save failed (will retry)");
        assert_eq!(Status::FailedToLoad.text(), "Failed to load data");
        assert_eq!(Status::AutoSaveInitialized.text(), "Auto-save initialized");
    }

    #[test]
    fn storage_full_is_distinct_from_retry() {
        assert_ne!(Status::StorageFull.text(), Status::SaveFailedWillRetry.text());
        assert_eq!(Status::StorageFull.level(), StatusLevel::Error);
        assert_eq!(Status::SaveFailedWillRetry.level(), StatusLevel::Warning);
    }

    #[test]
    fn texts_are_unique() {
        let all = [
            Status::Ready,
            Status::Loading,
            Status::Saving,
            Status::ChangesSaved,
            Status::SaveFailedWillRetry,
            Status::StorageFull,
            Status::FailedToLoad,
            Status::AutoSaveInitialized,
        ];
        let texts: std::collections::HashSet<_> = all.iter().map(|s| s.text()).collect();
        assert_eq!(texts.len(), all.len());
    }

    #[test]
    fn defaults() {
        assert_eq!(Status::default(), Status::Ready);
        assert_eq!(SaveState::default(), SaveState::Idle);
    }
}
