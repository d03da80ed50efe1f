//! Frame layout: header, editor, status bar, key help.

use std::sync::atomic::Ordering;

use ratatui::{
    layout::{Constraint, Layout, Position},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use savepoint_core::types::StatusLevel;

use super::AppRuntime;

impl AppRuntime {
    /// Last persistence error while the controller is still failing.
    pub(crate) fn failure_detail(&self) -> Option<String> {
        let state = self.autosave.read_state();
        match state.status.level() {
            StatusLevel::Info => None,
            _ => state.last_error.as_ref().map(|e| e.to_string()),
        }
    }

    pub(crate) fn render(&self, frame: &mut Frame) {
        let [header, body, status, help] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let offline = self.offline.load(Ordering::Relaxed);
        let mut title = vec![
            Span::styled("savepoint", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  remote: {}", self.remote_label)),
        ];
        if offline {
            title.push(Span::styled("  [offline]", Style::default().fg(Color::Yellow)));
        }
        if self.is_dirty() {
            title.push(Span::raw("  *"));
        }
        frame.render_widget(Paragraph::new(Line::from(title)), header);

        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(body);
        let lines: Vec<Line> = self
            .editor
            .lines()
            .iter()
            .map(|l| Line::raw(l.as_str()))
            .collect();
        let (row, col) = self.editor.cursor();
        let scroll = (row as u16).saturating_sub(inner.height.saturating_sub(1));
        frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), body);
        if self.pending_load.is_none() {
            frame.set_cursor_position(Position::new(
                inner.x + (col as u16).min(inner.width.saturating_sub(1)),
                inner.y + (row as u16).saturating_sub(scroll),
            ));
        }

        let mut trail = self.status_bar.recent(4);
        let current = trail.pop().unwrap_or("");
        let mut spans = vec![Span::styled(current, self.status_bar.style())];
        if let Some(error) = self.failure_detail() {
            spans.push(Span::styled(format!(": {}", error), self.status_bar.style()));
        }
        if !trail.is_empty() {
            spans.push(Span::styled(
                format!("  ({})", trail.join(" > ")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), status);

        frame.render_widget(
            Paragraph::new(Line::styled(
                "^S save  ^R reload  ^O offline  Esc quit",
                Style::default().fg(Color::DarkGray),
            )),
            help,
        );
    }
}
