//! Key handling: editing, explicit save, reload, offline toggle, quit.

use std::sync::atomic::Ordering;
use std::time::Instant;

use super::{AppRuntime, QUIT_SAVE_TIMEOUT};
use crate::ui::KeyInput;

impl AppRuntime {
    pub(crate) fn handle_key(&mut self, key: KeyInput) {
        match key {
            KeyInput::Escape | KeyInput::Ctrl('q') => self.request_quit(),
            KeyInput::Ctrl('s') => self.autosave.save_now(),
            KeyInput::Ctrl('r') => {
                self.pending_load = Some(self.autosave.load());
            }
            KeyInput::Ctrl('o') => {
                let offline = !self.offline.load(Ordering::Relaxed);
                self.offline.store(offline, Ordering::Relaxed);
                log::info!("offline simulation {}", if offline { "on" } else { "off" });
            }
            KeyInput::Ctrl(_) => {}
            _ if self.pending_load.is_some() || self.quit_deadline.is_some() => {}
            KeyInput::Char(c) => {
                self.editor.insert_char(c);
                self.changed();
            }
            KeyInput::Enter => {
                self.editor.newline();
                self.changed();
            }
            KeyInput::Backspace => {
                if self.editor.backspace() {
                    self.changed();
                }
            }
            KeyInput::Left => self.editor.move_left(),
            KeyInput::Right => self.editor.move_right(),
            KeyInput::Up => self.editor.move_up(),
            KeyInput::Down => self.editor.move_down(),
        }
    }

    /// Quit now if everything is saved, otherwise flush first.
    fn request_quit(&mut self) {
        if self.quit_deadline.is_some() || !self.is_dirty() {
            self.quit = true;
            return;
        }
        self.autosave.save_now();
        self.quit_deadline = Some(Instant::now() + QUIT_SAVE_TIMEOUT);
    }
}
