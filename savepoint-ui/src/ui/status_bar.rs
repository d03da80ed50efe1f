use ratatui::style::{Color, Style};

use savepoint_types::{StatusEvent, StatusLevel};

/// Renders the latest status pushed by the auto-save controller and keeps a
/// short history for the log line.
pub struct StatusBar {
    events: Vec<StatusEvent>,
    max: usize,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max: 32,
        }
    }

    pub fn push(&mut self, event: StatusEvent) {
        self.events.push(event);
        if self.events.len() > self.max {
            self.events.remove(0);
        }
    }

    pub fn current(&self) -> Option<&StatusEvent> {
        self.events.last()
    }

    /// Up to `n` most recent texts, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&'static str> {
        let start = self.events.len().saturating_sub(n);
        self.events[start..].iter().map(|e| e.text()).collect()
    }

    pub fn style(&self) -> Style {
        match self.current().map(|e| e.status.level()) {
            Some(StatusLevel::Warning) => Style::default().fg(Color::Yellow),
            Some(StatusLevel::Error) => Style::default().fg(Color::Red),
            Some(StatusLevel::Info) | None => Style::default().fg(Color::Green),
        }
    }
}
