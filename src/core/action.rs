//! # Actions
//!
//! Everything that can happen to the scanner becomes an `Action`.
//! User presses stop? That's `Action::Stop`.
//! The reader sees a tag? That's `Action::TagDiscovered(event)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns the `Effect` the runtime must carry out. No side
//! effects here. I/O happens in `runtime`.
//!
//! ```text
//! Scanner + Action  →  update()  →  Scanner' + Effect
//! ```
//!
//! Results of effects come back as new actions. Each carries the `epoch` or
//! listener id it was started under, so results from an abandoned probe or a
//! replaced listener are recognised and dropped.

use std::time::Duration;

use chrono::NaiveTime;
use log::{debug, info, warn};

use crate::api::{ApiError, SendReceipt};
use crate::core::state::Scanner;
use crate::core::step::Step;
use crate::nfc::{ListenerId, TagEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // User actions
    /// Start (or restart) initialization: startup and the "initialize" button.
    Initialize,
    /// "I have enabled NFC" after visiting the settings.
    ConfirmSettings,
    /// "Scan again" after a tag was read.
    ResumeScanning,
    GoToSettings,
    DismissAlert,
    Stop,
    Send,
    Quit,

    // Capability results
    CapabilityChecked { epoch: u64, present: bool },
    ListenerRegistered { epoch: u64, listener: ListenerId },
    ListenerFailed { epoch: u64, reason: String },
    TagDiscovered(TagEvent),
    /// The listener is gone and the UID has been decoded.
    TagDecoded(String),
    SettingsOpened,
    SettingsFailed(String),

    // HTTP / timer results
    SendFinished {
        seq: u64,
        tag_id: String,
        result: Result<SendReceipt, ApiError>,
        at: NaiveTime,
    },
    ReturnTimerElapsed(u64),
}

/// I/O the runtime performs on behalf of `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Release `release` (if any), check presence, report `CapabilityChecked`.
    Probe {
        epoch: u64,
        release: Option<ListenerId>,
    },
    /// Register a tag listener, report `ListenerRegistered` / `ListenerFailed`.
    RegisterListener { epoch: u64 },
    ReleaseListener(ListenerId),
    /// Unregister `listener`, then decode `uid`, then report `TagDecoded`.
    ConsumeTag { listener: ListenerId, uid: Vec<u8> },
    OpenSettings,
    /// POST `tag_id`, report `SendFinished` carrying the same `seq`.
    SendTag { seq: u64, tag_id: String },
    ScheduleReturn { token: u64, delay: Duration },
    Quit { release: Option<ListenerId> },
}

pub fn update(scanner: &mut Scanner, action: Action) -> Effect {
    match action {
        Action::Initialize => {
            if scanner.step.is_terminal() {
                debug!("Ignoring Initialize in terminal step {}", scanner.step);
                return Effect::None;
            }
            begin_initialization(scanner)
        }
        Action::ConfirmSettings => {
            if scanner.step != Step::WaitingForNfcEnabled {
                return Effect::None;
            }
            begin_initialization(scanner)
        }
        Action::ResumeScanning => {
            if scanner.step != Step::TagRead {
                return Effect::None;
            }
            begin_initialization(scanner)
        }

        Action::CapabilityChecked { epoch, present } => {
            if epoch != scanner.epoch || scanner.step != Step::Initializing {
                debug!("Dropping stale presence check (epoch {epoch})");
                return Effect::None;
            }
            if present {
                Effect::RegisterListener { epoch }
            } else {
                set_step(scanner, Step::NoNfc);
                Effect::None
            }
        }
        Action::ListenerRegistered { epoch, listener } => {
            if epoch != scanner.epoch || scanner.step != Step::Initializing {
                info!("Releasing {listener} registered for abandoned epoch {epoch}");
                return Effect::ReleaseListener(listener);
            }
            scanner.listener = Some(listener);
            set_step(scanner, Step::WaitingForTag);
            Effect::None
        }
        Action::ListenerFailed { epoch, reason } => {
            if epoch != scanner.epoch || scanner.step != Step::Initializing {
                return Effect::None;
            }
            warn!("Listener registration failed: {reason}");
            set_step(scanner, Step::NfcNotEnabled);
            Effect::None
        }

        Action::TagDiscovered(event) => {
            if scanner.step != Step::WaitingForTag || scanner.listener != Some(event.listener) {
                debug!(
                    "Dropping tag event for {} (active: {:?})",
                    event.listener, scanner.listener
                );
                return Effect::None;
            }
            // At most one discovery per registration: forget the listener now
            // so duplicates arriving before it is removed are dropped above.
            scanner.listener = None;
            Effect::ConsumeTag {
                listener: event.listener,
                uid: event.uid,
            }
        }
        Action::TagDecoded(tag_id) => {
            if scanner.step != Step::WaitingForTag {
                return Effect::None;
            }
            info!("Tag read: {tag_id}");
            scanner.tag_id = tag_id;
            set_step(scanner, Step::TagRead);
            Effect::None
        }

        Action::GoToSettings => {
            if scanner.step != Step::NfcNotEnabled || scanner.alert.is_some() {
                return Effect::None;
            }
            Effect::OpenSettings
        }
        Action::SettingsOpened => {
            if scanner.step == Step::NfcNotEnabled {
                set_step(scanner, Step::WaitingForNfcEnabled);
            }
            Effect::None
        }
        Action::SettingsFailed(reason) => {
            warn!("Opening NFC settings failed: {reason}");
            scanner.alert = Some(format!(
                "An error occurred while trying to open the NFC settings.\n{reason}"
            ));
            Effect::None
        }
        Action::DismissAlert => {
            scanner.alert = None;
            Effect::None
        }

        Action::Stop => {
            if !matches!(scanner.step, Step::WaitingForTag | Step::TagRead) {
                return Effect::None;
            }
            scanner.pending_return = None;
            scanner.epoch += 1;
            set_step(scanner, Step::Cancelled);
            match scanner.listener.take() {
                Some(listener) => Effect::ReleaseListener(listener),
                None => Effect::None,
            }
        }

        Action::Send => {
            if scanner.step != Step::TagRead || scanner.sending {
                return Effect::None;
            }
            scanner.sending = true;
            scanner.send_seq += 1;
            Effect::SendTag {
                seq: scanner.send_seq,
                tag_id: scanner.tag_id.clone(),
            }
        }
        Action::SendFinished {
            seq,
            tag_id,
            result,
            at,
        } => {
            if seq != scanner.send_seq || !scanner.sending {
                info!("Dropping result of abandoned send {seq} for {tag_id}");
                return Effect::None;
            }
            scanner.sending = false;
            scanner.send_status = scanner
                .messages
                .outcome(&tag_id, &result, scanner.return_delay, at);
            if scanner.step != Step::TagRead {
                debug!("Send finished after leaving TagRead; no return scheduled");
                return Effect::None;
            }
            scanner.next_timer += 1;
            let token = scanner.next_timer;
            scanner.pending_return = Some(token);
            Effect::ScheduleReturn {
                token,
                delay: scanner.return_delay,
            }
        }
        Action::ReturnTimerElapsed(token) => {
            if scanner.pending_return != Some(token) {
                debug!("Ignoring cancelled return timer {token}");
                return Effect::None;
            }
            scanner.pending_return = None;
            begin_initialization(scanner)
        }

        Action::Quit => Effect::Quit {
            release: scanner.listener.take(),
        },
    }
}

/// The initialization procedure: reset the status, invalidate anything still
/// in flight from the previous cycle, and probe the capability again.
fn begin_initialization(scanner: &mut Scanner) -> Effect {
    scanner.send_status = scanner.messages.not_sent.clone();
    scanner.pending_return = None;
    // A send still in flight belongs to the previous tag.
    if scanner.sending {
        scanner.sending = false;
        scanner.send_seq += 1;
    }
    scanner.epoch += 1;
    set_step(scanner, Step::Initializing);
    Effect::Probe {
        epoch: scanner.epoch,
        release: scanner.listener.take(),
    }
}

fn set_step(scanner: &mut Scanner, step: Step) {
    if scanner.step != step {
        info!("Step: {} → {}", scanner.step, step);
    }
    scanner.step = step;
}
