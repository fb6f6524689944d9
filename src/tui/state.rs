// ABOUTME: TUI state types — displayed chat lines, relay/user events, and the input buffer.
// ABOUTME: Drives the TUI rendering and bridges the relay worker to the display.

use std::time::Instant;

/// The kind of a single chat message displayed in the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessageKind {
    User,
    Assistant,
    /// Inline failure notice for a turn that got no reply.
    Error,
    System,
}

/// A single message in the chat display.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub kind: ChatMessageKind,
    pub content: String,
}

/// Events sent from the relay worker to the TUI via an mpsc channel.
#[derive(Debug)]
pub enum RelayEvent {
    /// The generation service replied; the turn is in the transcript.
    Reply(String),
    /// The turn failed; the transcript is unchanged.
    Error(String),
    /// Current transcript length after the turn.
    TranscriptLength(usize),
    /// The worker finished processing the turn.
    Done,
}

/// Events sent from the TUI to the relay worker.
#[derive(Debug)]
pub enum UserEvent {
    /// User submitted a chat message.
    Message(String),
    /// User requested to quit.
    Quit,
}

/// Full TUI application state.
pub struct TuiState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub cursor_pos: usize,
    pub scroll_offset: u16,
    /// A turn is in flight; input is blocked until the worker reports Done.
    pub waiting: bool,
    pub title: String,
    pub placeholder: String,
    pub model: String,
    pub transcript_len: usize,
    pub session_start: Instant,
}

impl TuiState {
    /// Create a new empty TUI state for the given model name.
    pub fn new(model: String) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            waiting: false,
            title: "apoteker".to_string(),
            placeholder: String::new(),
            model,
            transcript_len: 0,
            session_start: Instant::now(),
        }
    }

    /// Add a message to the chat history and reset scroll to bottom.
    pub fn push_message(&mut self, kind: ChatMessageKind, content: String) {
        self.messages.push(ChatMessage { kind, content });
        self.scroll_offset = 0;
    }

    /// Fold a worker event into the display.
    pub fn apply_relay_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::Reply(text) => self.push_message(ChatMessageKind::Assistant, text),
            RelayEvent::Error(text) => self.push_message(ChatMessageKind::Error, text),
            RelayEvent::TranscriptLength(len) => self.transcript_len = len,
            RelayEvent::Done => self.waiting = false,
        }
    }

    /// Submit the current input buffer. Returns the trimmed text if non-empty.
    pub fn submit_input(&mut self) -> Option<String> {
        let trimmed = self.input.trim().to_string();
        if trimmed.is_empty() {
            return None;
        }
        self.input.clear();
        self.cursor_pos = 0;
        Some(trimmed)
    }

    /// Record a submitted message locally and enter the waiting state.
    pub fn begin_turn(&mut self, text: &str) {
        self.push_message(ChatMessageKind::User, text.to_string());
        self.waiting = true;
    }

    /// Clamp the cursor position to the valid character range of the input buffer.
    pub fn clamp_cursor(&mut self) {
        self.cursor_pos = self.cursor_pos.min(self.input_char_len());
    }

    /// Return the current cursor byte index in the UTF-8 input buffer.
    pub fn cursor_byte_index(&self) -> usize {
        char_index_to_byte_index(&self.input, self.cursor_pos)
    }

    /// Return the total number of characters in the input buffer.
    pub fn input_char_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at the cursor and advance by one character.
    pub fn insert_char_at_cursor(&mut self, c: char) {
        self.clamp_cursor();
        let byte_index = self.cursor_byte_index();
        self.input.insert(byte_index, c);
        self.cursor_pos += 1;
    }

    /// Delete the character before the cursor (backspace behavior).
    pub fn backspace_char(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos == 0 {
            return;
        }

        let end = self.cursor_byte_index();
        let start = char_index_to_byte_index(&self.input, self.cursor_pos - 1);
        self.input.replace_range(start..end, "");
        self.cursor_pos -= 1;
    }

    /// Delete the character at the cursor (delete behavior).
    pub fn delete_char_at_cursor(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos >= self.input_char_len() {
            return;
        }

        let start = self.cursor_byte_index();
        let end = char_index_to_byte_index(&self.input, self.cursor_pos + 1);
        self.input.replace_range(start..end, "");
    }

    pub fn move_cursor_left(&mut self) {
        self.clamp_cursor();
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos < self.input_char_len() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input_char_len();
    }

    /// Split the input buffer on newlines. Always yields at least one line.
    pub fn input_lines(&self) -> Vec<&str> {
        self.input.split('\n').collect()
    }

    pub fn input_line_count(&self) -> usize {
        self.input_lines().len()
    }

    /// Line index the cursor sits on.
    pub fn cursor_line(&self) -> usize {
        self.input
            .chars()
            .take(self.cursor_pos)
            .filter(|&c| c == '\n')
            .count()
    }

    /// Character column of the cursor within its line.
    pub fn cursor_column(&self) -> usize {
        self.input
            .chars()
            .take(self.cursor_pos)
            .collect::<Vec<_>>()
            .iter()
            .rev()
            .take_while(|&&c| c != '\n')
            .count()
    }

    /// Move the cursor to the previous input line. Returns false on the first line.
    pub fn move_cursor_up_in_input(&mut self) -> bool {
        self.clamp_cursor();
        let line = self.cursor_line();
        if line == 0 {
            return false;
        }
        let col = self.cursor_column();
        self.cursor_pos = self.position_at(line - 1, col);
        true
    }

    /// Move the cursor to the next input line. Returns false on the last line.
    pub fn move_cursor_down_in_input(&mut self) -> bool {
        self.clamp_cursor();
        let line = self.cursor_line();
        if line + 1 >= self.input_line_count() {
            return false;
        }
        let col = self.cursor_column();
        self.cursor_pos = self.position_at(line + 1, col);
        true
    }

    /// Character offset of (line, col), with col clamped to the line length.
    fn position_at(&self, line: usize, col: usize) -> usize {
        let lines = self.input_lines();
        let before: usize = lines.iter().take(line).map(|l| l.chars().count() + 1).sum();
        let len = lines.get(line).map(|l| l.chars().count()).unwrap_or(0);
        before + col.min(len)
    }
}

fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }

    match s.char_indices().nth(char_index) {
        Some((idx, _)) => idx,
        None => s.len(),
    }
}
