//! Feedback draining: status events and save/load completions.

use savepoint_core::controller::{AutoSaveFeedback, LoadOutcome, SaveOutcome};

use super::AppRuntime;

impl AppRuntime {
    pub(crate) fn drain_feedback(&mut self) {
        while let Ok(event) = self.status_rx.try_recv() {
            self.status_bar.push(event);
        }

        for feedback in self.autosave.drain_feedback() {
            match feedback {
                AutoSaveFeedback::LoadComplete { id, result } => {
                    if self.pending_load != Some(id) {
                        continue;
                    }
                    self.pending_load = None;
                    match result {
                        Ok(LoadOutcome::Recovered(snapshot)) => {
                            log::info!("recovered unsynced revision {} from local storage", snapshot.revision);
                            self.editor.set_text(&snapshot.body);
                            // push the recovered copy to the remote
                            self.changed();
                        }
                        Ok(LoadOutcome::Remote(body)) => {
                            self.editor.set_text(&body);
                            self.publish_text();
                        }
                        Ok(LoadOutcome::Empty) => {}
                        Err(e) => log::error!("load failed: {}", e),
                    }
                }
                AutoSaveFeedback::SaveComplete(outcome) => {
                    if self.quit_deadline.is_none() {
                        continue;
                    }
                    // Quit once the flush finished, unless it will be retried
                    // and the deadline still allows it.
                    match outcome {
                        SaveOutcome::Saved { .. } if !self.is_dirty() => self.quit = true,
                        SaveOutcome::Halted { .. } => self.quit = true,
                        _ => {}
                    }
                }
            }
        }
    }
}
