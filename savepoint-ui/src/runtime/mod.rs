//! App runtime coordinator.
//!
//! - `input`: key handling and editor mutations
//! - `feedback`: status events and save/load completions from the worker
//! - `render`: frame layout

mod feedback;
mod input;
mod render;

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use savepoint_core::controller::AutoSaveHandle;
use savepoint_core::types::StatusEvent;

use crate::ui::{Editor, RatatuiBackend, StatusBar};

/// How long quitting waits for a final save.
const QUIT_SAVE_TIMEOUT: Duration = Duration::from_secs(3);

/// Top-level runtime that owns the document and drives the event loop.
pub struct AppRuntime {
    pub(crate) editor: Editor,
    /// Copy of the editor text read by the auto-save worker at flush time.
    pub(crate) shared: Arc<Mutex<String>>,
    pub(crate) autosave: AutoSaveHandle,
    pub(crate) status_rx: Receiver<StatusEvent>,
    pub(crate) status_bar: StatusBar,
    pub(crate) offline: Arc<AtomicBool>,
    pub(crate) remote_label: String,

    /// Load request whose result is still outstanding; edits wait for it.
    pub(crate) pending_load: Option<u64>,
    /// Number of change notifications sent; compared with the saved revision.
    pub(crate) notified: u64,
    pub(crate) quit_deadline: Option<Instant>,
    pub(crate) quit: bool,
}

impl AppRuntime {
    pub fn new(
        mut autosave: AutoSaveHandle,
        shared: Arc<Mutex<String>>,
        offline: Arc<AtomicBool>,
        remote_label: String,
    ) -> Self {
        let status_rx = autosave.subscribe();
        let pending_load = Some(autosave.load());
        Self {
            editor: Editor::new(),
            shared,
            autosave,
            status_rx,
            status_bar: StatusBar::new(),
            offline,
            remote_label,
            pending_load,
            notified: 0,
            quit_deadline: None,
            quit: false,
        }
    }

    pub fn run(&mut self, backend: &mut RatatuiBackend) -> std::io::Result<()> {
        while !self.quit {
            if let Some(key) = backend.poll_key(Duration::from_millis(50))? {
                self.handle_key(key);
            }
            self.drain_feedback();
            if let Some(deadline) = self.quit_deadline {
                if Instant::now() >= deadline {
                    log::warn!("final save did not finish in time, quitting anyway");
                    self.quit = true;
                }
            }
            backend.draw(|frame| self.render(frame))?;
        }
        Ok(())
    }

    /// Unsaved edits exist.
    pub(crate) fn is_dirty(&self) -> bool {
        let saved = self.autosave.read_state().last_saved_revision.unwrap_or(0);
        self.notified > saved
    }

    pub(crate) fn publish_text(&mut self) {
        if let Ok(mut text) = self.shared.lock() {
            *text = self.editor.text();
        }
    }

    /// Copy the editor into the shared snapshot and tell the worker.
    pub(crate) fn changed(&mut self) {
        self.publish_text();
        self.notified += 1;
        self.autosave.notify_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::SwitchableTarget;
    use crate::ui::KeyInput;
    use savepoint_core::controller::AutoSaveConfig;
    use savepoint_core::store::MemoryStore;
    use savepoint_core::target::FileTarget;

    fn runtime(dir: &std::path::Path) -> AppRuntime {
        std::fs::write(dir.join("doc.txt"), "hello").unwrap();
        let offline = Arc::new(AtomicBool::new(false));
        let shared = Arc::new(Mutex::new(String::new()));
        let source = {
            let shared = shared.clone();
            move || shared.lock().unwrap().clone()
        };
        let config = AutoSaveConfig {
            idle_interval: Duration::from_millis(20),
            ..AutoSaveConfig::default()
        };
        let handle = AutoSaveHandle::spawn(
            config,
            source,
            SwitchableTarget::new(FileTarget::new(dir.join("doc.txt")), offline.clone()),
            Some(Box::new(MemoryStore::new(1024))),
        )
        .unwrap();
        AppRuntime::new(handle, shared, offline, "doc.txt".to_string())
    }

    fn wait_until(app: &mut AppRuntime, mut done: impl FnMut(&AppRuntime) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(app) {
            assert!(Instant::now() < deadline, "timed out");
            std::thread::sleep(Duration::from_millis(10));
            app.drain_feedback();
        }
    }

    #[test]
    fn loads_then_saves_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = runtime(dir.path());
        wait_until(&mut app, |a| a.pending_load.is_none());
        assert_eq!(app.editor.text(), "hello");

        app.handle_key(KeyInput::Left);
        app.handle_key(KeyInput::Char('!'));
        assert!(app.is_dirty());
        assert_eq!(*app.shared.lock().unwrap(), "hell!o");

        wait_until(&mut app, |a| !a.is_dirty());
        assert_eq!(std::fs::read_to_string(dir.path().join("doc.txt")).unwrap(), "hell!o");
    }

    #[test]
    fn offline_failure_shows_error_until_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = runtime(dir.path());
        wait_until(&mut app, |a| a.pending_load.is_none());
        assert_eq!(app.failure_detail(), None);

        app.handle_key(KeyInput::Ctrl('o'));
        app.handle_key(KeyInput::Char('?'));
        wait_until(&mut app, |a| a.failure_detail().is_some());
        assert!(app.failure_detail().unwrap().contains("offline"));

        app.handle_key(KeyInput::Ctrl('o'));
        app.handle_key(KeyInput::Ctrl('s'));
        wait_until(&mut app, |a| !a.is_dirty());
        assert_eq!(app.failure_detail(), None);
    }

    #[test]
    fn quit_when_clean_is_immediate() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = runtime(dir.path());
        wait_until(&mut app, |a| a.pending_load.is_none());
        app.handle_key(KeyInput::Escape);
        assert!(app.quit);
        assert!(app.quit_deadline.is_none());
    }

    #[test]
    fn quit_when_dirty_flushes_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = runtime(dir.path());
        wait_until(&mut app, |a| a.pending_load.is_none());
        app.handle_key(KeyInput::Char('x'));
        app.handle_key(KeyInput::Ctrl('q'));
        assert!(!app.quit);
        assert!(app.quit_deadline.is_some());
        wait_until(&mut app, |a| a.quit);
        assert_eq!(std::fs::read_to_string(dir.path().join("doc.txt")).unwrap(), "hellox");
    }
}
