//! AutoSaveCore: the save/load state machine.
//!
//! Time is passed in by the caller, so every transition can be driven
//! deterministically. The worker thread feeds it `Instant::now()`.

use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use super::{AutoSaveConfig, LoadOutcome, SaveOutcome};
use crate::status::StatusReporter;
use crate::store::{decode_record, encode_record, LocalStore};
use crate::target::{PersistenceTarget, SnapshotSource};
use crate::types::{LoadError, PersistError, SaveState, Snapshot, Status, StatusEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schedule {
    Idle,
    Debounce {
        first_change: Instant,
        last_change: Instant,
    },
    Due(Instant),
    Retry {
        attempt: u32,
        at: Instant,
    },
    /// Capacity exceeded; waits for an explicit save.
    Halted,
}

pub struct AutoSaveCore {
    config: AutoSaveConfig,
    source: Box<dyn SnapshotSource>,
    remote: Box<dyn PersistenceTarget>,
    local: Option<Box<dyn LocalStore>>,
    reporter: StatusReporter,
    schedule: Schedule,
    changed_revision: u64,
    saved_revision: u64,
    attempts: u64,
    /// The local record is older than the remote copy but could not be removed.
    stale_fallback: bool,
}

impl AutoSaveCore {
    pub fn new(
        config: AutoSaveConfig,
        source: impl SnapshotSource + 'static,
        remote: impl PersistenceTarget + 'static,
        local: Option<Box<dyn LocalStore>>,
    ) -> Self {
        let mut reporter = StatusReporter::new();
        reporter.set_status(Status::AutoSaveInitialized, SaveState::Idle);
        log::info!(
            target: "autosave",
            "auto-save initialized (enabled: {}, idle: {:?}, remote: {}, local fallback: {})",
            config.enabled,
            config.idle_interval,
            remote.describe(),
            local.is_some()
        );
        Self {
            config,
            source: Box::new(source),
            remote: Box::new(remote),
            local,
            reporter,
            schedule: Schedule::Idle,
            changed_revision: 0,
            saved_revision: 0,
            attempts: 0,
            stale_fallback: false,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<StatusEvent> {
        self.reporter.subscribe()
    }

    /// Status mirror that never holds more than the newest event.
    pub fn subscribe_latest(&mut self) -> Receiver<StatusEvent> {
        self.reporter.subscribe_latest()
    }

    pub fn attach(&mut self, tx: Sender<StatusEvent>) {
        self.reporter.attach(tx);
    }

    /// The host's document changed.
    pub fn notify_changed(&mut self, now: Instant) {
        self.changed_revision += 1;
        if !self.config.enabled {
            return;
        }
        self.schedule = match self.schedule {
            Schedule::Idle => Schedule::Debounce {
                first_change: now,
                last_change: now,
            },
            Schedule::Debounce { first_change, .. } => Schedule::Debounce {
                first_change,
                last_change: now,
            },
            // Already waiting on a deadline; the change rides along with it.
            pending @ (Schedule::Due(_) | Schedule::Retry { .. } | Schedule::Halted) => pending,
        };
    }

    /// Save as soon as possible. Also resumes after a capacity halt.
    pub fn request_save(&mut self, now: Instant) {
        if self.schedule == Schedule::Halted {
            log::info!(target: "autosave", "explicit save requested, resuming after storage-full halt");
        }
        self.schedule = Schedule::Due(now);
    }

    /// When the next attempt is due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.schedule {
            Schedule::Idle | Schedule::Halted => None,
            Schedule::Debounce {
                first_change,
                last_change,
            } => Some(
                (last_change + self.config.idle_interval).min(first_change + self.config.max_wait),
            ),
            Schedule::Due(at) | Schedule::Retry { at, .. } => Some(at),
        }
    }

    /// Run one save attempt if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SaveOutcome> {
        match self.next_deadline() {
            Some(deadline) if deadline <= now => Some(self.attempt(now)),
            _ => None,
        }
    }

    fn attempt(&mut self, now: Instant) -> SaveOutcome {
        let previous = self.schedule;
        let revision = self.changed_revision;

        self.reporter.set_status(Status::Saving, SaveState::Saving);
        let snapshot = Snapshot::new(revision, self.source.snapshot());
        self.attempts += 1;

        match self.remote.persist(&snapshot) {
            Ok(()) => self.on_saved(revision, now),
            Err(error @ PersistError::Transient(_)) => self.on_transient(error, &snapshot, previous, now),
            Err(error @ PersistError::CapacityExceeded { .. }) => self.halt(revision, error),
        }
    }

    fn on_saved(&mut self, revision: u64, now: Instant) -> SaveOutcome {
        self.saved_revision = self.saved_revision.max(revision);
        self.clear_fallback();
        self.reporter.set_status(Status::ChangesSaved, SaveState::Saved);
        log::debug!(target: "autosave", "saved revision {}", revision);

        self.schedule = if self.is_dirty() && self.config.enabled {
            Schedule::Debounce {
                first_change: now,
                last_change: now,
            }
        } else {
            Schedule::Idle
        };
        SaveOutcome::Saved { revision }
    }

    fn on_transient(
        &mut self,
        error: PersistError,
        snapshot: &Snapshot,
        previous: Schedule,
        now: Instant,
    ) -> SaveOutcome {
        let fallback = match self.local.as_mut() {
            Some(local) => Some(
                encode_record(snapshot).and_then(|bytes| local.put(&self.config.local_key, &bytes)),
            ),
            None => None,
        };
        let fallback_stored = match fallback {
            Some(Ok(())) => {
                self.stale_fallback = false;
                true
            }
            Some(Err(full @ PersistError::CapacityExceeded { .. })) => {
                return self.halt(snapshot.revision, full);
            }
            Some(Err(e)) => {
                log::warn!(target: "store", "fallback write failed: {}", e);
                false
            }
            None => false,
        };

        let attempt = match previous {
            Schedule::Retry { attempt, .. } => attempt.saturating_add(1),
            _ => 1,
        };
        let delay = self.config.retry.delay(attempt);
        self.schedule = Schedule::Retry {
            attempt,
            at: now + delay,
        };
        self.reporter
            .set_status(Status::SaveFailedWillRetry, SaveState::SaveFailed);
        log::warn!(
            target: "autosave",
            "save of revision {} failed (attempt {}), retrying in {:?}: {}",
            snapshot.revision,
            attempt,
            delay,
            error
        );
        SaveOutcome::RetryScheduled {
            revision: snapshot.revision,
            attempt,
            delay,
            error,
            fallback_stored,
        }
    }

    fn halt(&mut self, revision: u64, error: PersistError) -> SaveOutcome {
        self.schedule = Schedule::Halted;
        self.reporter
            .set_status(Status::StorageFull, SaveState::SaveFailed);
        log::error!(target: "autosave", "save of revision {} halted: {}", revision, error);
        SaveOutcome::Halted { revision, error }
    }

    /// Fetch the persisted document, preferring an unsynced local copy.
    pub fn load(&mut self) -> Result<LoadOutcome, LoadError> {
        self.reporter.set_status(Status::Loading, SaveState::Loading);

        let remote = self.remote.fetch();
        let recovered = self.read_fallback();

        let outcome = match (remote, recovered) {
            (remote, Some(snapshot)) => {
                if let Err(e) = remote {
                    log::warn!(target: "autosave", "remote load failed, using local copy: {}", e);
                }
                LoadOutcome::Recovered(snapshot)
            }
            (Ok(Some(body)), None) => LoadOutcome::Remote(body),
            (Ok(None), None) => LoadOutcome::Empty,
            (Err(e), None) => {
                log::error!(target: "autosave", "load failed: {}", e);
                self.reporter
                    .set_status(Status::FailedToLoad, SaveState::LoadFailed);
                return Err(LoadError(e));
            }
        };

        let state = match outcome {
            LoadOutcome::Remote(_) => {
                self.saved_revision = self.changed_revision;
                SaveState::Saved
            }
            LoadOutcome::Recovered(_) | LoadOutcome::Empty => SaveState::Idle,
        };
        self.reporter.set_status(Status::Ready, state);
        Ok(outcome)
    }

    /// Remove the local record once the remote holds a newer revision.
    fn clear_fallback(&mut self) {
        let Some(local) = self.local.as_mut() else {
            return;
        };
        match local.remove(&self.config.local_key) {
            Ok(()) => self.stale_fallback = false,
            Err(e) => {
                log::warn!(target: "store", "could not clear fallback copy: {}", e);
                self.stale_fallback = true;
            }
        }
    }

    fn read_fallback(&mut self) -> Option<Snapshot> {
        if self.stale_fallback {
            self.clear_fallback();
            if self.stale_fallback {
                log::warn!(target: "store", "ignoring out-of-date fallback copy");
                return None;
            }
        }
        let local = self.local.as_mut()?;
        match local.get(&self.config.local_key) {
            Ok(Some(bytes)) => decode_record(&bytes),
            Ok(None) => None,
            Err(e) => {
                log::warn!(target: "store", "could not read fallback copy: {}", e);
                None
            }
        }
    }

    pub fn status(&self) -> Status {
        self.reporter.current()
    }

    pub fn save_state(&self) -> SaveState {
        self.reporter.state()
    }

    pub fn is_dirty(&self) -> bool {
        self.changed_revision > self.saved_revision
    }

    pub fn is_halted(&self) -> bool {
        self.schedule == Schedule::Halted
    }

    /// Total number of persistence calls made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}
