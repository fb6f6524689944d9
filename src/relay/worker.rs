// ABOUTME: Relay worker — owns the session and runs one relay turn per user message.
// ABOUTME: Bridges the TUI (UserEvent in, RelayEvent out) to the ConversationRelay.

use tokio::sync::mpsc;

use crate::error::RelayError;
use crate::prompt::Persona;
use crate::relay::ConversationRelay;
use crate::session::SessionSlot;
use crate::tui::state::{RelayEvent, UserEvent};

/// Bundled parameters for the relay loop.
pub struct RelayLoopParams {
    pub relay: ConversationRelay,
    pub persona: Persona,
}

/// Run the relay loop until the user quits or the channel closes.
///
/// Messages are handled strictly one at a time, so a session never has more
/// than one request in flight. The session slot is activated on the first
/// message and lives as long as this loop.
pub async fn run_relay_loop(
    params: RelayLoopParams,
    mut user_rx: mpsc::Receiver<UserEvent>,
    event_tx: mpsc::Sender<RelayEvent>,
) -> SessionSlot {
    let mut slot = SessionSlot::new();

    while let Some(event) = user_rx.recv().await {
        match event {
            UserEvent::Quit => break,
            UserEvent::Message(text) => {
                // Blank input starts no turn and leaves the slot untouched.
                if text.trim().is_empty() {
                    tracing::debug!("ignoring blank input");
                    let _ = event_tx.send(RelayEvent::Done).await;
                    continue;
                }

                let session = slot.activate(params.persona.seed());

                match params.relay.send(session, &text).await {
                    Ok(reply) => {
                        let _ = event_tx.send(RelayEvent::Reply(reply)).await;
                    }
                    Err(RelayError::Validation(e)) => {
                        tracing::debug!("ignoring input: {}", e);
                        let _ = event_tx.send(RelayEvent::Done).await;
                        continue;
                    }
                    Err(RelayError::Upstream(e)) => {
                        tracing::warn!(
                            service = params.relay.service_name(),
                            "turn failed: {}",
                            e
                        );
                        let text = params
                            .persona
                            .error_text(params.relay.service_name(), &e.to_string());
                        let _ = event_tx.send(RelayEvent::Error(text)).await;
                    }
                }

                let _ = event_tx
                    .send(RelayEvent::TranscriptLength(session.len()))
                    .await;
                let _ = event_tx.send(RelayEvent::Done).await;
            }
        }
    }

    slot
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::UpstreamError;
    use crate::relay::testing::{ScriptedService, reply};
    use crate::relay::RelayOptions;

    fn params(service: Arc<ScriptedService>) -> RelayLoopParams {
        RelayLoopParams {
            relay: ConversationRelay::new(service, RelayOptions::default()),
            persona: Persona::new(),
        }
    }

    async fn drain(rx: &mut mpsc::Receiver<RelayEvent>) -> Vec<RelayEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = matches!(event, RelayEvent::Done);
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn successful_turn_emits_reply_then_done() {
        let service = Arc::new(ScriptedService::replies(&["Paracetamol"]));
        let (user_tx, user_rx) = mpsc::channel(4);
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_relay_loop(params(service), user_rx, event_tx));

        user_tx
            .send(UserEvent::Message("Obat apa untuk demam?".to_string()))
            .await
            .unwrap();
        let events = drain(&mut event_rx).await;

        assert!(matches!(&events[0], RelayEvent::Reply(t) if t == "Paracetamol"));
        assert!(matches!(events[1], RelayEvent::TranscriptLength(4)));
        assert!(matches!(events[2], RelayEvent::Done));

        user_tx.send(UserEvent::Quit).await.unwrap();
        let slot = handle.await.unwrap();
        assert_eq!(slot.session().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn failed_turn_emits_error_and_keeps_length() {
        let service = Arc::new(ScriptedService::new(vec![
            Err(UpstreamError::Network("dns failure".to_string())),
            Ok(reply("Antasida")),
        ]));
        let (user_tx, user_rx) = mpsc::channel(4);
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_relay_loop(params(service), user_rx, event_tx));

        user_tx
            .send(UserEvent::Message("Maag?".to_string()))
            .await
            .unwrap();
        let events = drain(&mut event_rx).await;
        match &events[0] {
            RelayEvent::Error(text) => {
                assert!(text.starts_with("Maaf, terjadi kesalahan"));
                assert!(text.contains("Scripted"));
                assert!(text.contains("dns failure"));
            }
            _ => panic!("expected Error event"),
        }
        assert!(matches!(events[1], RelayEvent::TranscriptLength(2)));

        user_tx
            .send(UserEvent::Message("Maag?".to_string()))
            .await
            .unwrap();
        let events = drain(&mut event_rx).await;
        assert!(matches!(&events[0], RelayEvent::Reply(t) if t == "Antasida"));

        drop(user_tx);
        let slot = handle.await.unwrap();
        assert_eq!(slot.session().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn blank_input_emits_only_done() {
        let service = Arc::new(ScriptedService::replies(&["Paracetamol"]));
        let (user_tx, user_rx) = mpsc::channel(4);
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_relay_loop(params(service.clone()), user_rx, event_tx));

        user_tx
            .send(UserEvent::Message("   ".to_string()))
            .await
            .unwrap();
        user_tx.send(UserEvent::Quit).await.unwrap();
        let slot = handle.await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = event_rx.recv().await {
            events.push(event);
        }
        assert_eq!(events.len(), 1, "got {events:?}");
        assert!(matches!(events[0], RelayEvent::Done));
        assert!(!slot.is_active());
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn quit_before_any_message_leaves_slot_uninitialized() {
        let service = Arc::new(ScriptedService::replies(&[]));
        let (user_tx, user_rx) = mpsc::channel(4);
        let (event_tx, _event_rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_relay_loop(params(service.clone()), user_rx, event_tx));

        user_tx.send(UserEvent::Quit).await.unwrap();
        let slot = handle.await.unwrap();
        assert!(!slot.is_active());
        assert_eq!(service.calls(), 0);
    }
}
