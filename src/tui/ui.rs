// ABOUTME: Main TUI rendering function — assembles header, chat, input, and status bar.
// ABOUTME: Splits the terminal frame into vertical layout chunks and delegates to widgets.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::tui::state::TuiState;
use crate::tui::widgets::chat::render_chat_lines;
use crate::tui::widgets::status::{StatusBarParams, status_line};

/// Maximum height the input area can grow to (in terminal rows).
const MAX_INPUT_HEIGHT: u16 = 8;

/// Render the full TUI screen layout to the given frame.
pub fn render(frame: &mut Frame, state: &mut TuiState) {
    let area = frame.area();

    // +2 accounts for top and bottom borders
    let input_height = (state.input_line_count() as u16 + 2).clamp(3, MAX_INPUT_HEIGHT);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Header
            Constraint::Min(3),               // Chat area
            Constraint::Length(input_height), // Input area
            Constraint::Length(1),            // Status bar
        ])
        .split(area);

    // Header
    let header = Line::from(Span::styled(
        format!(" {}", state.title),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(header), chunks[0]);

    // Chat area
    let chat_chunk = chunks[1];
    let visible_height = chat_chunk.height;

    // ratatui's line_count() matches its own wrapping, so the scroll math
    // never hides the bottom of the transcript.
    let chat_paragraph = Paragraph::new(render_chat_lines(&state.messages)).wrap(Wrap { trim: false });
    let total_lines = clamp_line_count(chat_paragraph.line_count(chat_chunk.width));
    let max_scroll = total_lines.saturating_sub(visible_height);

    if state.scroll_offset > max_scroll {
        state.scroll_offset = max_scroll;
    }

    // scroll_offset is lines scrolled up from the bottom (0 = at bottom)
    let scroll = max_scroll.saturating_sub(state.scroll_offset);
    frame.render_widget(chat_paragraph.scroll((scroll, 0)), chat_chunk);

    // Input area
    let input_chunk = chunks[2];
    let mut input_block = Block::default().borders(Borders::TOP | Borders::BOTTOM);
    if state.waiting {
        input_block = input_block
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(" waiting... ", Style::default().fg(Color::DarkGray)));
    }

    let input = if state.input.is_empty() && !state.waiting {
        Paragraph::new(Span::styled(
            state.placeholder.clone(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let style = if state.waiting {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        Paragraph::new(state.input.clone()).style(style)
    };
    frame.render_widget(input.block(input_block), input_chunk);

    if !state.waiting && input_chunk.width > 0 && input_chunk.height > 1 {
        state.clamp_cursor();

        let cursor_line = state.cursor_line();
        let cursor_col = state.cursor_column();

        // Visual (display) width of the text before the cursor on its line.
        let lines = state.input_lines();
        let line_text = lines.get(cursor_line).copied().unwrap_or("");
        let prefix: String = line_text.chars().take(cursor_col).collect();
        let visual_col = UnicodeWidthStr::width(prefix.as_str());

        let max_visual_col = input_chunk.width.saturating_sub(1) as usize;
        let cursor_x = input_chunk
            .x
            .saturating_add(visual_col.min(max_visual_col) as u16);
        // +1 for the top border, then offset by the cursor's line index.
        let cursor_y = input_chunk.y.saturating_add(1 + cursor_line as u16);
        frame.set_cursor_position(Position::new(cursor_x, cursor_y));
    }

    // Status bar
    let status = status_line(&StatusBarParams {
        model: &state.model,
        transcript_len: state.transcript_len,
        elapsed: state.session_start.elapsed(),
        waiting: state.waiting,
    });
    frame.render_widget(Paragraph::new(status), chunks[3]);
}

/// Saturate a wrapped line count to the u16 range ratatui scrolls in.
fn clamp_line_count(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX)
}
