use std::sync::mpsc::Sender;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use super::commands::ControllerCmd;
use super::{AutoSaveCore, AutoSaveFeedback};

/// Owns the core on its own thread. Persistence calls run here one at a
/// time; commands that queue up meanwhile are folded into the next attempt.
pub(crate) struct Worker {
    core: AutoSaveCore,
    cmd_rx: Receiver<ControllerCmd>,
    feedback_tx: Sender<AutoSaveFeedback>,
}

impl Worker {
    pub(crate) fn new(
        core: AutoSaveCore,
        cmd_rx: Receiver<ControllerCmd>,
        feedback_tx: Sender<AutoSaveFeedback>,
    ) -> Self {
        Self {
            core,
            cmd_rx,
            feedback_tx,
        }
    }

    pub(crate) fn run(mut self) {
        'run: loop {
            let received = match self.core.next_deadline() {
                Some(deadline) => match self.cmd_rx.recv_deadline(deadline) {
                    Ok(cmd) => Some(cmd),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.cmd_rx.recv() {
                    Ok(cmd) => Some(cmd),
                    Err(_) => break,
                },
            };

            if let Some(cmd) = received {
                if self.handle_cmd(cmd) {
                    break;
                }
            }

            loop {
                match self.cmd_rx.try_recv() {
                    Ok(cmd) => {
                        if self.handle_cmd(cmd) {
                            break 'run;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'run,
                }
            }

            if let Some(outcome) = self.core.poll(Instant::now()) {
                let _ = self.feedback_tx.send(AutoSaveFeedback::SaveComplete(outcome));
            }
        }
        log::debug!(
            target: "autosave",
            "worker stopped (dirty: {}, attempts: {})",
            self.core.is_dirty(),
            self.core.attempts()
        );
    }

    /// Returns true on shutdown.
    fn handle_cmd(&mut self, cmd: ControllerCmd) -> bool {
        match cmd {
            ControllerCmd::Changed => self.core.notify_changed(Instant::now()),
            ControllerCmd::SaveNow => self.core.request_save(Instant::now()),
            ControllerCmd::Load { id } => {
                let result = self.core.load();
                let _ = self
                    .feedback_tx
                    .send(AutoSaveFeedback::LoadComplete { id, result });
            }
            ControllerCmd::Subscribe(tx) => self.core.attach(tx),
            ControllerCmd::Shutdown => return true,
        }
        false
    }
}
