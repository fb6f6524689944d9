// ABOUTME: Keyboard input handling for the TUI — translates key events into actions.
// ABOUTME: Handles normal typing, multiline editing, scrolling, and the waiting state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::state::TuiState;

/// The result of processing a key event.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    /// No action needed.
    None,
    /// User submitted a non-empty message.
    Send(String),
    /// User wants to quit.
    Quit,
}

/// Process a key event against the current TUI state and return the resulting action.
pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> InputResult {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputResult::Quit;
    }

    // PageUp/PageDown always scroll, regardless of mode.
    if handle_scroll_key(state, key.code) {
        return InputResult::None;
    }

    // While a turn is in flight only scrolling and quitting are available.
    if state.waiting {
        match key.code {
            KeyCode::Up => state.scroll_offset = state.scroll_offset.saturating_add(1),
            KeyCode::Down => state.scroll_offset = state.scroll_offset.saturating_sub(1),
            _ => {}
        }
        return InputResult::None;
    }

    // Up/Down move within multiline input first, then fall back to chat scrolling.
    match key.code {
        KeyCode::Up => {
            if !state.move_cursor_up_in_input() {
                state.scroll_offset = state.scroll_offset.saturating_add(1);
            }
            return InputResult::None;
        }
        KeyCode::Down => {
            if !state.move_cursor_down_in_input() {
                state.scroll_offset = state.scroll_offset.saturating_sub(1);
            }
            return InputResult::None;
        }
        _ => {}
    }

    match key.code {
        // Shift+Enter inserts a newline into the input buffer.
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            state.insert_char_at_cursor('\n');
            InputResult::None
        }
        KeyCode::Enter => match state.submit_input() {
            Some(text) => InputResult::Send(text),
            None => InputResult::None,
        },
        KeyCode::Char(c) => {
            state.insert_char_at_cursor(c);
            InputResult::None
        }
        KeyCode::Backspace => {
            state.backspace_char();
            InputResult::None
        }
        KeyCode::Delete => {
            state.delete_char_at_cursor();
            InputResult::None
        }
        KeyCode::Left => {
            state.move_cursor_left();
            InputResult::None
        }
        KeyCode::Right => {
            state.move_cursor_right();
            InputResult::None
        }
        KeyCode::Home => {
            state.move_cursor_home();
            InputResult::None
        }
        KeyCode::End => {
            state.move_cursor_end();
            InputResult::None
        }
        KeyCode::Esc => InputResult::Quit,
        _ => InputResult::None,
    }
}

fn handle_scroll_key(state: &mut TuiState, key: KeyCode) -> bool {
    match key {
        KeyCode::PageUp => {
            state.scroll_offset = state.scroll_offset.saturating_add(10);
            true
        }
        KeyCode::PageDown => {
            state.scroll_offset = state.scroll_offset.saturating_sub(10);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_shift_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    #[test]
    fn typing_appends_to_input() {
        let mut state = TuiState::new("m".to_string());
        let result = handle_key(&mut state, make_key(KeyCode::Char('h')));
        assert_eq!(result, InputResult::None);
        assert_eq!(state.input, "h");
        assert_eq!(state.cursor_pos, 1);

        handle_key(&mut state, make_key(KeyCode::Char('i')));
        assert_eq!(state.input, "hi");
        assert_eq!(state.cursor_pos, 2);
    }

    #[test]
    fn enter_submits_input() {
        let mut state = TuiState::new("m".to_string());
        state.input = "demam".to_string();
        state.cursor_pos = 5;
        let result = handle_key(&mut state, make_key(KeyCode::Enter));
        assert_eq!(result, InputResult::Send("demam".to_string()));
        assert_eq!(state.input, "");
        assert_eq!(state.cursor_pos, 0);
    }

    #[test]
    fn enter_on_empty_or_blank_does_nothing() {
        let mut state = TuiState::new("m".to_string());
        assert_eq!(handle_key(&mut state, make_key(KeyCode::Enter)), InputResult::None);

        state.input = " \n ".to_string();
        assert_eq!(handle_key(&mut state, make_key(KeyCode::Enter)), InputResult::None);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn backspace_deletes() {
        let mut state = TuiState::new("m".to_string());
        state.input = "abc".to_string();
        state.cursor_pos = 3;
        let result = handle_key(&mut state, make_key(KeyCode::Backspace));
        assert_eq!(result, InputResult::None);
        assert_eq!(state.input, "ab");
        assert_eq!(state.cursor_pos, 2);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut state = TuiState::new("m".to_string());
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut state, key), InputResult::Quit);
    }

    #[test]
    fn ctrl_c_quits_while_waiting() {
        let mut state = TuiState::new("m".to_string());
        state.waiting = true;
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut state, key), InputResult::Quit);
    }

    #[test]
    fn waiting_ignores_input() {
        let mut state = TuiState::new("m".to_string());
        state.waiting = true;
        let result = handle_key(&mut state, make_key(KeyCode::Char('x')));
        assert_eq!(result, InputResult::None);
        assert_eq!(state.input, "");
    }

    #[test]
    fn waiting_blocks_a_second_send() {
        let mut state = TuiState::new("m".to_string());
        state.input = "second".to_string();
        state.waiting = true;
        assert_eq!(handle_key(&mut state, make_key(KeyCode::Enter)), InputResult::None);
        assert_eq!(state.input, "second");
    }

    #[test]
    fn waiting_still_allows_scroll_keys() {
        let mut state = TuiState::new("m".to_string());
        state.waiting = true;
        state.scroll_offset = 2;

        handle_key(&mut state, make_key(KeyCode::Up));
        assert_eq!(state.scroll_offset, 3);
        handle_key(&mut state, make_key(KeyCode::Down));
        assert_eq!(state.scroll_offset, 2);
        handle_key(&mut state, make_key(KeyCode::PageUp));
        assert_eq!(state.scroll_offset, 12);
    }

    #[test]
    fn unicode_editing_through_key_events() {
        let mut state = TuiState::new("m".to_string());
        handle_key(&mut state, make_key(KeyCode::Char('🙂')));
        handle_key(&mut state, make_key(KeyCode::Char('é')));
        assert_eq!(state.input, "🙂é");
        assert_eq!(state.cursor_pos, 2);

        handle_key(&mut state, make_key(KeyCode::Left));
        handle_key(&mut state, make_key(KeyCode::Delete));
        assert_eq!(state.input, "🙂");
        assert_eq!(state.cursor_pos, 1);

        handle_key(&mut state, make_key(KeyCode::Backspace));
        assert_eq!(state.input, "");
        assert_eq!(state.cursor_pos, 0);
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut state = TuiState::new("m".to_string());
        state.input = "hello".to_string();
        state.cursor_pos = 5;
        let result = handle_key(&mut state, make_shift_key(KeyCode::Enter));
        assert_eq!(result, InputResult::None);
        assert_eq!(state.input, "hello\n");
        assert_eq!(state.cursor_pos, 6);
    }

    #[test]
    fn up_at_first_line_scrolls_chat() {
        let mut state = TuiState::new("m".to_string());
        state.input = "hello".to_string();
        state.cursor_pos = 3;
        handle_key(&mut state, make_key(KeyCode::Up));
        assert_eq!(state.scroll_offset, 1);
    }

    #[test]
    fn up_on_second_line_moves_cursor() {
        let mut state = TuiState::new("m".to_string());
        state.input = "abc\ndef".to_string();
        // cursor at 'e' (a,b,c,\n,d,e)
        state.cursor_pos = 5;
        handle_key(&mut state, make_key(KeyCode::Up));
        assert_eq!(state.cursor_pos, 1);
        assert_eq!(state.scroll_offset, 0);
    }

    #[test]
    fn esc_quits() {
        let mut state = TuiState::new("m".to_string());
        assert_eq!(handle_key(&mut state, make_key(KeyCode::Esc)), InputResult::Quit);
    }
}
