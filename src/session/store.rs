// ABOUTME: Session store — the append-only transcript plus the external context handle.
// ABOUTME: SessionSlot models the one-way Uninitialized -> Active lifecycle.

use super::message::Message;

/// Opaque conversation handle issued by a generation service that keeps its own history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextHandle(String);

impl ContextHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Conversational state between one user and the generation service.
#[derive(Debug, Default)]
pub struct Session {
    transcript: Vec<Message>,
    context: Option<ContextHandle>,
}

impl Session {
    /// Create a session whose transcript starts with `seed` (which may be empty).
    pub fn initialize(seed: impl IntoIterator<Item = Message>) -> Self {
        Self {
            transcript: seed.into_iter().collect(),
            context: None,
        }
    }

    /// Push one message and return the new transcript length.
    pub fn append(&mut self, message: Message) -> usize {
        self.transcript.push(message);
        self.transcript.len()
    }

    /// Messages in insertion order. Clone the iterator (or call again) to restart.
    pub fn all(&self) -> impl Iterator<Item = &Message> + Clone + '_ {
        self.transcript.iter()
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.transcript.last()
    }

    pub fn context(&self) -> Option<&ContextHandle> {
        self.context.as_ref()
    }

    pub fn set_context(&mut self, handle: Option<ContextHandle>) {
        self.context = handle;
    }
}

/// Holder for the session of one UI run.
#[derive(Debug, Default)]
pub enum SessionSlot {
    #[default]
    Uninitialized,
    Active(Session),
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::Uninitialized
    }

    /// Activate the slot on first access. An already active session is returned
    /// as-is and `seed` is dropped.
    pub fn activate(&mut self, seed: impl IntoIterator<Item = Message>) -> &mut Session {
        if let SessionSlot::Uninitialized = self {
            *self = SessionSlot::Active(Session::initialize(seed));
        }
        match self {
            SessionSlot::Active(session) => session,
            SessionSlot::Uninitialized => unreachable!("slot was activated above"),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionSlot::Active(session) => Some(session),
            SessionSlot::Uninitialized => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionSlot::Active(_))
    }
}
