// App module - split into submodules
// - mod.rs: App struct, constructor, terminal lifecycle, health probe
// - event_loop.rs: Main run() loop
// - rendering.rs: Screen layout and draw()
// - handlers.rs: Action dispatch into the call controller

mod event_loop;
mod handlers;
mod rendering;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::call::{CallBackend, CallController, CallRequestDraft};
use crate::components::CallForm;
use crate::config::{ConfigManager, Theme};
use crate::error::{DialerError, Result};

/// Result of the most recent backend health probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendHealth {
    Checking,
    Online,
    Unreachable(String),
}

pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    should_quit: bool,
    needs_redraw: bool,
    last_tick: Instant,
    tick_interval: Duration,
    controller: CallController,
    call_form: CallForm,
    theme: Theme,
    health: BackendHealth,
    health_tx: mpsc::UnboundedSender<BackendHealth>,
    health_rx: mpsc::UnboundedReceiver<BackendHealth>,
}

impl App {
    /// Take over the terminal and build the form. Must be called inside a tokio
    /// runtime context.
    pub fn new(config: &ConfigManager, backend: Arc<dyn CallBackend>) -> Result<Self> {
        enable_raw_mode().map_err(|e| DialerError::Terminal(e.to_string()))?;
        // No App yet, so Drop can't undo raw mode if the rest of setup fails
        let terminal = restore_on_err(Self::enter_terminal(), restore_terminal)?;

        let app_config = config.app_config();
        let theme = config.theme().clone();
        let draft = CallRequestDraft::with_wait_for_answer(app_config.form.wait_for_answer);
        let (health_tx, health_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            terminal,
            should_quit: false,
            needs_redraw: true,
            last_tick: Instant::now(),
            tick_interval: Duration::from_millis(app_config.general.tick_interval_ms.max(16)),
            controller: CallController::new(backend, draft),
            call_form: CallForm::new(theme.clone()),
            theme,
            health: BackendHealth::Checking,
            health_tx,
            health_rx,
        };
        app.start_health_probe();
        Ok(app)
    }

    fn enter_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .map_err(|e| DialerError::Terminal(e.to_string()))?;
        Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| DialerError::Terminal(e.to_string()))
    }

    pub(super) fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Probe the backend in the background; the result arrives on `health_rx`
    pub(super) fn start_health_probe(&mut self) {
        self.health = BackendHealth::Checking;
        let backend = self.controller.backend();
        let health_tx = self.health_tx.clone();

        tokio::spawn(async move {
            let health = match backend.health().await {
                Ok(response) if response.is_ok() => BackendHealth::Online,
                Ok(response) => BackendHealth::Unreachable(format!("status: {}", response.status)),
                Err(e) => BackendHealth::Unreachable(e.to_string()),
            };
            match &health {
                BackendHealth::Online => tracing::info!("Backend {} is online", backend.endpoint()),
                BackendHealth::Unreachable(reason) => {
                    tracing::warn!("Backend {} unreachable: {}", backend.endpoint(), reason)
                }
                BackendHealth::Checking => {}
            }
            let _ = health_tx.send(health);
        });
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
}

/// Run `restore` if `result` is an error, then pass the result through
fn restore_on_err<T>(result: Result<T>, restore: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        restore();
    }
    result
}

impl Drop for App {
    fn drop(&mut self) {
        restore_terminal();
    }
}
