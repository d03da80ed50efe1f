//! StatusReporter: the single writer of the user-visible save status.
//!
//! Display surfaces subscribe and receive every [`StatusEvent`] over a
//! channel. Mirrors that only care about the newest value use
//! [`StatusReporter::subscribe_latest`], whose channel never holds more than
//! one event. The reporter performs no I/O of its own.

use crossbeam_channel::{Receiver, Sender};

use crate::types::{SaveState, Status, StatusEvent};

pub struct StatusReporter {
    current: StatusEvent,
    subscribers: Vec<Sender<StatusEvent>>,
    /// Single-slot channels, with a receiver kept here to evict the old value.
    latest: Vec<(Sender<StatusEvent>, Receiver<StatusEvent>)>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self {
            current: StatusEvent::new(Status::Ready, SaveState::Idle),
            subscribers: Vec::new(),
            latest: Vec::new(),
        }
    }

    /// Record a new status and notify every live subscriber.
    pub fn set_status(&mut self, status: Status, state: SaveState) {
        self.current = StatusEvent::new(status, state);
        log::debug!(target: "autosave", "status: {} ({:?})", status, state);
        let event = self.current;
        self.subscribers.retain(|tx| tx.send(event).is_ok());
        for (tx, stale) in &self.latest {
            // only this thread sends, so the slot is free after the eviction
            let _ = stale.try_recv();
            let _ = tx.try_send(event);
        }
    }

    /// Register a display surface. The current status is delivered at once.
    pub fn subscribe(&mut self) -> Receiver<StatusEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.attach(tx);
        rx
    }

    /// Register an existing sender (used when the receiver lives on another thread).
    pub fn attach(&mut self, tx: Sender<StatusEvent>) {
        if tx.send(self.current).is_ok() {
            self.subscribers.push(tx);
        }
    }

    /// Register a mirror that holds only the newest status. Unread events
    /// are replaced, so a receiver that is rarely drained stays one event long.
    pub fn subscribe_latest(&mut self) -> Receiver<StatusEvent> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _ = tx.try_send(self.current);
        self.latest.push((tx, rx.clone()));
        rx
    }

    pub fn current(&self) -> Status {
        self.current.status
    }

    pub fn state(&self) -> SaveState {
        self.current.state
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}
