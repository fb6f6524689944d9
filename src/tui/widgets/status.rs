// ABOUTME: Status bar widget — renders model name, transcript size, session time, and busy state.
// ABOUTME: Displayed at the bottom of the TUI as a single-line summary.

use std::time::Duration;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Inputs for the status bar line.
pub struct StatusBarParams<'a> {
    pub model: &'a str,
    pub transcript_len: usize,
    pub elapsed: Duration,
    pub waiting: bool,
}

/// Render the status bar line.
pub fn status_line(params: &StatusBarParams<'_>) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled(format!(" {} ", params.model), Style::default().fg(Color::Cyan)),
        Span::styled("| ", dim),
        Span::styled(
            format!("{} messages ", params.transcript_len),
            Style::default().fg(Color::White),
        ),
        Span::styled("| ", dim),
        Span::styled(
            format!("{} ", format_elapsed(params.elapsed)),
            Style::default().fg(Color::White),
        ),
    ];

    if params.waiting {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled("waiting... ", Style::default().fg(Color::Yellow)));
    }

    Line::from(spans)
}

/// Format a session duration as m:ss, or h:mm:ss past the hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
