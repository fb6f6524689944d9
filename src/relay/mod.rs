// ABOUTME: Conversation relay — forwards a user turn to the generation service and records the exchange.
// ABOUTME: A turn is committed to the transcript only after a reply arrives within the timeout.

pub mod gemini;
pub mod provider;
pub mod responses;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{RelayError, UpstreamError};
use crate::session::{ContextHandle, Message, Session};

pub use provider::create_service;
pub use worker::{RelayLoopParams, run_relay_loop};

/// How conversation history reaches the generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// The whole transcript is sent with every turn.
    #[default]
    Resend,
    /// The service keeps history; after the first call only the new turn and
    /// the context handle are sent.
    Stateful,
}

/// One call to the generation service.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Prior messages, oldest first. Empty when the service already holds them.
    pub history: Vec<Message>,
    pub context: Option<ContextHandle>,
    pub prompt: String,
}

/// A reply from the generation service.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub context: Option<ContextHandle>,
}

/// A hosted text-generation API.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Display name used in error messages and the status bar.
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Whether the service keeps conversation history behind a context handle.
    fn retains_context(&self) -> bool {
        false
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, UpstreamError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RelayOptions {
    pub timeout: Duration,
    pub context: ContextMode,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            context: ContextMode::Resend,
        }
    }
}

/// Pass-through between a session and a generation service.
pub struct ConversationRelay {
    service: Arc<dyn GenerationService>,
    options: RelayOptions,
}

impl ConversationRelay {
    pub fn new(service: Arc<dyn GenerationService>, options: RelayOptions) -> Self {
        Self { service, options }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub fn options(&self) -> RelayOptions {
        self.options
    }

    /// Send one user turn and return the reply text.
    ///
    /// Empty input fails with a validation error before the service is called.
    /// On success the user message and the reply are appended to the session
    /// (and the context handle is updated). On any failure the session is left
    /// exactly as it was.
    pub async fn send(&self, session: &mut Session, user_text: &str) -> Result<String, RelayError> {
        let user_msg = Message::user(user_text.trim())?;
        let request = self.build_request(session, &user_msg);

        tracing::debug!(
            service = self.service.name(),
            transcript_len = session.len(),
            history_len = request.history.len(),
            "sending turn"
        );

        let generation =
            match tokio::time::timeout(self.options.timeout, self.service.generate(request)).await {
                Ok(result) => result?,
                Err(_) => return Err(UpstreamError::Timeout(self.options.timeout).into()),
            };

        let reply = Message::assistant(generation.text).map_err(|_| UpstreamError::EmptyReply)?;
        let text = reply.text().to_string();

        session.append(user_msg);
        session.append(reply);
        if self.options.context == ContextMode::Stateful {
            session.set_context(generation.context);
        }

        Ok(text)
    }

    fn build_request(&self, session: &Session, user_msg: &Message) -> GenerationRequest {
        let (history, context) = match self.options.context {
            ContextMode::Resend => (session.all().cloned().collect(), None),
            ContextMode::Stateful => match session.context() {
                Some(handle) => (Vec::new(), Some(handle.clone())),
                // First call: the service has not seen the seed yet.
                None => (session.all().cloned().collect(), None),
            },
        };
        GenerationRequest {
            history,
            context,
            prompt: user_msg.text().to_string(),
        }
    }
}
