//! AutoSaveHandle: main-thread interface to the auto-save worker.
//!
//! Owns the command channel, the feedback channel and the worker's join
//! handle. Dropping the handle stops the worker, which also cancels any
//! pending retry.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver as StatusReceiver, Sender};

use super::commands::ControllerCmd;
use super::worker::Worker;
use super::{AutoSaveConfig, AutoSaveCore, AutoSaveFeedback, SaveOutcome};
use crate::store::LocalStore;
use crate::target::{PersistenceTarget, SnapshotSource};
use crate::types::{IoGeneration, PersistError, SaveState, Status, StatusEvent};

/// Worker-owned values mirrored on the main thread for display.
#[derive(Debug, Clone, Default)]
pub struct AutoSaveReadState {
    pub status: Status,
    pub state: SaveState,
    pub last_saved_revision: Option<u64>,
    pub last_error: Option<PersistError>,
}

/// Cloneable sender for change notifications from other threads.
#[derive(Clone)]
pub struct ChangeNotifier {
    cmd_tx: Sender<ControllerCmd>,
}

impl ChangeNotifier {
    /// Returns false once the worker has stopped.
    pub fn changed(&self) -> bool {
        self.cmd_tx.send(ControllerCmd::Changed).is_ok()
    }

    pub fn save_now(&self) -> bool {
        self.cmd_tx.send(ControllerCmd::SaveNow).is_ok()
    }
}

pub struct AutoSaveHandle {
    cmd_tx: Sender<ControllerCmd>,
    feedback_rx: Receiver<AutoSaveFeedback>,
    /// Holds at most the newest status, so it stays bounded when undrained.
    status_rx: StatusReceiver<StatusEvent>,
    read_state: AutoSaveReadState,
    generation: IoGeneration,
    join_handle: Option<JoinHandle<()>>,
}

impl AutoSaveHandle {
    pub fn spawn(
        config: AutoSaveConfig,
        source: impl SnapshotSource + 'static,
        remote: impl PersistenceTarget + 'static,
        local: Option<Box<dyn LocalStore>>,
    ) -> std::io::Result<Self> {
        let mut core = AutoSaveCore::new(config, source, remote, local);
        let status_rx = core.subscribe_latest();
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (feedback_tx, feedback_rx) = mpsc::channel();

        let join_handle = thread::Builder::new()
            .name("savepoint-autosave".to_string())
            .spawn(move || Worker::new(core, cmd_rx, feedback_tx).run())?;

        Ok(Self {
            cmd_tx,
            feedback_rx,
            status_rx,
            read_state: AutoSaveReadState::default(),
            generation: IoGeneration::default(),
            join_handle: Some(join_handle),
        })
    }

    fn send(&self, cmd: ControllerCmd) {
        if self.cmd_tx.send(cmd).is_err() {
            log::warn!(target: "autosave", "command dropped: worker stopped");
        }
    }

    pub fn notify_changed(&self) {
        self.send(ControllerCmd::Changed);
    }

    pub fn save_now(&self) {
        self.send(ControllerCmd::SaveNow);
    }

    /// Request a load. The matching `LoadComplete` carries the returned id;
    /// completions of earlier requests are discarded by `drain_feedback`.
    pub fn load(&mut self) -> u64 {
        let id = self.generation.next_load();
        self.send(ControllerCmd::Load { id });
        id
    }

    /// New display surface. Receives the current status first.
    pub fn subscribe(&self) -> StatusReceiver<StatusEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.send(ControllerCmd::Subscribe(tx));
        rx
    }

    pub fn notifier(&self) -> ChangeNotifier {
        ChangeNotifier {
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    /// Collect worker results. Call this regularly (once per UI frame, say):
    /// save completions queue up until drained.
    pub fn drain_feedback(&mut self) -> Vec<AutoSaveFeedback> {
        while let Ok(event) = self.status_rx.try_recv() {
            self.read_state.status = event.status;
            self.read_state.state = event.state;
        }

        let mut out = Vec::new();
        while let Ok(msg) = self.feedback_rx.try_recv() {
            match &msg {
                AutoSaveFeedback::SaveComplete(SaveOutcome::Saved { revision }) => {
                    self.read_state.last_saved_revision = Some(*revision);
                    self.read_state.last_error = None;
                }
                AutoSaveFeedback::SaveComplete(
                    SaveOutcome::RetryScheduled { error, .. } | SaveOutcome::Halted { error, .. },
                ) => {
                    self.read_state.last_error = Some(error.clone());
                }
                AutoSaveFeedback::LoadComplete { id, .. } => {
                    if !self.generation.is_current_load(*id) {
                        log::debug!(target: "autosave", "discarding stale load {}", id);
                        continue;
                    }
                }
            }
            out.push(msg);
        }
        out
    }

    pub fn read_state(&self) -> &AutoSaveReadState {
        &self.read_state
    }

    pub fn status(&self) -> Status {
        self.read_state.status
    }

    pub fn save_state(&self) -> SaveState {
        self.read_state.state
    }

    /// Stop the worker and wait for it. Pending retries are abandoned.
    pub fn shutdown(self) {}
}

impl Drop for AutoSaveHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(ControllerCmd::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
