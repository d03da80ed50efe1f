use crossbeam_channel::Sender;

use crate::types::StatusEvent;

/// Commands sent from the handle (or a [`super::ChangeNotifier`]) to the worker.
#[derive(Debug)]
pub(crate) enum ControllerCmd {
    Changed,
    SaveNow,
    Load { id: u64 },
    Subscribe(Sender<StatusEvent>),
    Shutdown,
}
