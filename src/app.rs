// ABOUTME: App orchestrator — wires together credentials, generation service, relay worker, and TUI.
// ABOUTME: Fails fast on configuration errors, then runs the crossterm event loop.

use std::io;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::config::{Config, Credentials, LlmConfig};
use crate::error::ConfigurationError;
use crate::prompt::Persona;
use crate::relay::{
    ConversationRelay, GenerationService, RelayLoopParams, RelayOptions, create_service,
    run_relay_loop,
};
use crate::tui::input::{InputResult, handle_key};
use crate::tui::state::{ChatMessageKind, RelayEvent, TuiState, UserEvent};
use crate::tui::ui;

/// Redraw interval so the session clock in the status bar keeps moving.
const TICK: Duration = Duration::from_millis(500);

/// Top-level application that orchestrates all subsystems.
pub struct App {
    config: Config,
}

impl App {
    /// Create a new app with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the application: resolve credentials, start the relay worker, and drive the TUI.
    pub async fn run(self) -> anyhow::Result<()> {
        // Load local .env if present, then the user's secrets file.
        let _ = dotenvy::dotenv();
        let _ = dotenvy::from_path(Config::secrets_env_path());

        // A missing key halts here, before any session or screen exists.
        let Startup {
            state,
            relay,
            persona,
        } = self.prepare(Credentials::resolve)?;

        // Channels for relay worker <-> TUI communication.
        let (user_tx, user_rx) = mpsc::channel::<UserEvent>(16);
        let (event_tx, event_rx) = mpsc::channel::<RelayEvent>(64);

        let worker = tokio::spawn(run_relay_loop(
            RelayLoopParams { relay, persona },
            user_rx,
            event_tx,
        ));

        let result = run_terminal(state, user_tx.clone(), event_rx).await;

        // Signal the worker to stop and wait for it.
        let _ = user_tx.send(UserEvent::Quit).await;
        drop(user_tx);
        match worker.await {
            Ok(slot) => {
                let len = slot.session().map(|s| s.len()).unwrap_or(0);
                tracing::info!(transcript_len = len, "session ended");
            }
            Err(e) => tracing::warn!("relay worker failed: {}", e),
        }

        result
    }

    /// Everything that can fail at startup, in order: credentials first, then
    /// the generation service. Nothing touches the terminal here.
    pub fn prepare<F>(&self, resolve: F) -> Result<Startup, ConfigurationError>
    where
        F: FnOnce(&LlmConfig) -> Result<Credentials, ConfigurationError>,
    {
        let credentials = resolve(&self.config.llm)?;
        let persona = Persona::from_config(&self.config.persona);
        let service = create_service(
            &self.config.llm,
            &credentials,
            persona.system_instruction.clone(),
        )?;

        tracing::info!(
            provider = %self.config.llm.provider,
            model = service.model(),
            context = ?self.config.llm.context,
            timeout_seconds = self.config.llm.timeout_seconds,
            "starting chat"
        );

        let state = initial_state(&persona, service.as_ref());
        let relay = ConversationRelay::new(
            service,
            RelayOptions {
                timeout: Duration::from_secs(self.config.llm.timeout_seconds),
                context: self.config.llm.context,
            },
        );

        Ok(Startup {
            state,
            relay,
            persona,
        })
    }
}

/// The pieces the terminal session needs once startup has succeeded.
pub struct Startup {
    pub state: TuiState,
    pub relay: ConversationRelay,
    pub persona: Persona,
}

/// The opening screen: subtitle plus the persona greeting. The seeded
/// instruction is part of the transcript but is not displayed.
pub fn initial_state(persona: &Persona, service: &dyn GenerationService) -> TuiState {
    let mut state = TuiState::new(service.model().to_string());
    state.title = persona.title.clone();
    state.placeholder = persona.input_placeholder.clone();
    state.transcript_len = persona.seed().len();

    if !persona.subtitle.is_empty() {
        state.push_message(ChatMessageKind::System, persona.subtitle.clone());
    }
    if !persona.greeting.trim().is_empty() {
        state.push_message(ChatMessageKind::Assistant, persona.greeting.clone());
    }
    state
}

/// Enter raw mode and the alternate screen, run the event loop, and always
/// restore the terminal afterwards.
async fn run_terminal(
    mut state: TuiState,
    user_tx: mpsc::Sender<UserEvent>,
    event_rx: mpsc::Receiver<RelayEvent>,
) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut state, &user_tx, event_rx).await;

    terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut TuiState,
    user_tx: &mpsc::Sender<UserEvent>,
    mut event_rx: mpsc::Receiver<RelayEvent>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal.draw(|frame| ui::render(frame, state))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match handle_key(state, key) {
                        InputResult::Send(text) => {
                            state.begin_turn(&text);
                            user_tx
                                .send(UserEvent::Message(text))
                                .await
                                .context("relay worker stopped")?;
                        }
                        InputResult::Quit => return Ok(()),
                        InputResult::None => {}
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("terminal event stream failed"),
                None => return Ok(()),
            },
            Some(event) = event_rx.recv() => state.apply_relay_event(event),
            _ = tick.tick() => {}
        }
    }
}
