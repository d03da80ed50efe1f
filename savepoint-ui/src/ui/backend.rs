use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode as CrosstermKeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

/// Keys the scratchpad reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Ctrl(char),
    Enter,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Escape,
}

/// Ratatui-based terminal backend
pub struct RatatuiBackend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl RatatuiBackend {
    /// Create a new ratatui backend (does not start terminal mode)
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    /// Enter raw mode and alternate screen
    pub fn start(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Leave raw mode and alternate screen
    pub fn stop(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> io::Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Wait up to `timeout` for a key press.
    pub fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyInput>> {
        let mut t = timeout;
        loop {
            if !event::poll(t)? {
                return Ok(None);
            }
            match event::read()? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    if let Some(key) = convert_key_event(key_event) {
                        return Ok(Some(key));
                    }
                    t = Duration::ZERO;
                }
                // Resize is handled by the next draw; other events are dropped.
                _ => t = Duration::ZERO,
            }
        }
    }
}

fn convert_key_event(event: KeyEvent) -> Option<KeyInput> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let key = match event.code {
        CrosstermKeyCode::Char(c) if ctrl => KeyInput::Ctrl(c.to_ascii_lowercase()),
        CrosstermKeyCode::Char(c) => KeyInput::Char(c),
        CrosstermKeyCode::Enter => KeyInput::Enter,
        CrosstermKeyCode::Backspace => KeyInput::Backspace,
        CrosstermKeyCode::Left => KeyInput::Left,
        CrosstermKeyCode::Right => KeyInput::Right,
        CrosstermKeyCode::Up => KeyInput::Up,
        CrosstermKeyCode::Down => KeyInput::Down,
        CrosstermKeyCode::Esc => KeyInput::Escape,
        CrosstermKeyCode::Tab => KeyInput::Char('\t'),
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_chars_are_lowercased() {
        let event = KeyEvent::new(CrosstermKeyCode::Char('S'), KeyModifiers::CONTROL);
        assert_eq!(convert_key_event(event), Some(KeyInput::Ctrl('s')));
    }

    #[test]
    fn plain_chars_pass_through() {
        let event = KeyEvent::new(CrosstermKeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(convert_key_event(event), Some(KeyInput::Char('x')));
        let event = KeyEvent::new(CrosstermKeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(convert_key_event(event), None);
    }
}
