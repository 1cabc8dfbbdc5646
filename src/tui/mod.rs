//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the view for
//! the current step, and translates key presses into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (initializing, waiting for a tag, sending): draws every
//!   ~80ms so the spinner moves.
//! - **Idle**: sleeps up to 500ms, only redraws on key presses, resizes or
//!   actions arriving from background tasks.

mod component;
mod components;
mod event;
mod ui;

use log::{info, warn};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crate::api::RideRecordClient;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::Scanner;
use crate::core::step::Step;
use crate::nfc::{self, ListenerId, SimulatedReader};
use crate::runtime::Runtime;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of scanner logic)
pub struct TuiState {
    pub reader_name: String,
    /// Whether `t` can fake a tap (simulated backend only).
    pub can_tap: bool,
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new(reader_name: String, can_tap: bool) -> Self {
        Self {
            reader_name,
            can_tap,
            spinner_frame: 0,
        }
    }
}

/// Map a key press to the button it stands for in the current step.
///
/// While an alert is open only dismiss (and Ctrl+C) get through.
pub fn action_for(event: TuiEvent, scanner: &Scanner) -> Option<Action> {
    if event == TuiEvent::ForceQuit {
        return Some(Action::Quit);
    }
    if scanner.alert.is_some() {
        return match event {
            TuiEvent::Confirm | TuiEvent::Escape => Some(Action::DismissAlert),
            _ => None,
        };
    }
    match event {
        TuiEvent::Quit | TuiEvent::Escape => Some(Action::Quit),
        TuiEvent::Confirm => match scanner.step {
            Step::NfcNotEnabled => Some(Action::GoToSettings),
            Step::WaitingForNfcEnabled => Some(Action::ConfirmSettings),
            Step::TagRead => Some(Action::Send),
            _ => None,
        },
        TuiEvent::Settings => Some(Action::GoToSettings),
        TuiEvent::Initialize => match scanner.step {
            Step::WaitingForNfcEnabled => Some(Action::ConfirmSettings),
            _ => Some(Action::Initialize),
        },
        TuiEvent::Stop => Some(Action::Stop),
        TuiEvent::Resume => Some(Action::ResumeScanning),
        TuiEvent::ForceQuit | TuiEvent::Tap | TuiEvent::Resize => None,
    }
}

fn simulate_tap(simulator: Option<&Arc<SimulatedReader>>) {
    let Some(reader) = simulator else {
        return;
    };
    match reader.tap() {
        Some(uid) => info!("Simulated tap of {}", nfc::hex::bytes_to_hex(&uid)),
        None => warn!("No simulated tags configured"),
    }
}

/// Run the scanner UI until the user quits.
///
/// The loop itself is synchronous; it only awaits on the way out to release
/// the remaining listeners.
pub async fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend = nfc::build_backend(&config);
    let recorder = RideRecordClient::new(
        config.endpoint_url.clone(),
        config.device_id,
        config.request_timeout,
    )
    .map_err(|e| std::io::Error::other(e.to_string()))?;
    info!("Ride records go to {}", recorder.endpoint());

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let runtime = Runtime::new(backend.capability.clone(), Arc::new(recorder), tx);

    let mut scanner = Scanner::from_config(&config);
    let mut tui = TuiState::new(
        runtime.capability_name().to_string(),
        backend.simulator.is_some(),
    );

    let mut terminal = ratatui::init();

    runtime.execute(update(&mut scanner, Action::Initialize));

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = matches!(scanner.step, Step::Initializing | Step::WaitingForTag)
            || scanner.sending;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &scanner, &tui))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let mut quit: Option<Option<ListenerId>> = None;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if event == TuiEvent::Tap {
                simulate_tap(backend.simulator.as_ref());
                continue;
            }
            let Some(action) = action_for(event, &scanner) else {
                continue;
            };
            match update(&mut scanner, action) {
                Effect::Quit { release } => {
                    quit = Some(release);
                    break;
                }
                effect => runtime.execute(effect),
            }
        }

        if quit.is_none() {
            // Handle background task actions (capability callbacks, HTTP, timers)
            let drained = runtime.drain(&mut scanner, &rx);
            if drained.handled > 0 {
                needs_redraw = true;
            }
            if drained.quit {
                quit = Some(drained.release);
            }
        }

        if let Some(release) = quit {
            info!("Shutting down in step {}", scanner.step);
            ratatui::restore();
            runtime.shutdown(release, &rx).await;
            return Ok(());
        }
    }
}
