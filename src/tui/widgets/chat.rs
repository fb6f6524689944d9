// ABOUTME: Chat widget — renders chat messages into styled ratatui Lines.
// ABOUTME: Each message kind (user, assistant, error, system) has distinct visual styling.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::state::{ChatMessage, ChatMessageKind};

/// Render a slice of chat messages into styled Lines for display.
pub fn render_chat_lines(messages: &[ChatMessage]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, msg) in messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }

        match &msg.kind {
            ChatMessageKind::User => {
                prefixed_lines(&mut lines, "❯ ", Color::Green, &msg.content, Style::default());
            }
            ChatMessageKind::Assistant => {
                prefixed_lines(&mut lines, "⏺ ", Color::Cyan, &msg.content, Style::default());
            }
            ChatMessageKind::Error => {
                prefixed_lines(
                    &mut lines,
                    "✗ ",
                    Color::Red,
                    &msg.content,
                    Style::default().fg(Color::Red),
                );
            }
            ChatMessageKind::System => {
                for text in msg.content.split('\n') {
                    lines.push(Line::from(Span::styled(
                        text.to_string(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
            }
        }
    }

    lines
}

/// First line gets the colored prefix, continuation lines are plain.
fn prefixed_lines(
    lines: &mut Vec<Line<'static>>,
    prefix: &'static str,
    color: Color,
    content: &str,
    body: Style,
) {
    for (i, text) in content.split('\n').enumerate() {
        if i == 0 {
            lines.push(Line::from(vec![
                Span::styled(prefix, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(text.to_string(), body),
            ]));
        } else {
            lines.push(Line::from(Span::styled(text.to_string(), body)));
        }
    }
}
