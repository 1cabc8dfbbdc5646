//! # Effect Runtime
//!
//! Carries out the `Effect`s returned by `core::update()` on tokio tasks and
//! reports every outcome back as an `Action` on the shared channel. The event
//! loop (TUI or test) owns the receiving end and feeds those actions back
//! through `update()`, so state only ever changes on the loop thread.
//!
//! ```text
//!  loop ──update()──► Effect ──execute()──► tokio task ──► NfcCapability / RideRecorder
//!   ▲                                                           │
//!   └───────────────────── mpsc::Sender<Action> ◄───────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::time::Duration;

use chrono::Local;
use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::api::RideRecorder;
use crate::core::action::{Action, Effect, update};
use crate::core::state::Scanner;
use crate::nfc::{ListenerId, NfcCapability, TagHandler};

pub struct Runtime {
    nfc: Arc<dyn NfcCapability>,
    recorder: Arc<dyn RideRecorder>,
    tx: mpsc::Sender<Action>,
    /// Registration tasks that may still hand back a listener.
    registrations: Mutex<Vec<JoinHandle<()>>>,
}

/// What one `drain()` pass did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Drained {
    pub handled: usize,
    pub quit: bool,
    /// Listener still registered when `Quit` arrived; pass to `shutdown()`.
    pub release: Option<ListenerId>,
}

fn dispatch(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to send action: receiver dropped");
    }
}

impl Runtime {
    pub fn new(
        nfc: Arc<dyn NfcCapability>,
        recorder: Arc<dyn RideRecorder>,
        tx: mpsc::Sender<Action>,
    ) -> Self {
        Self {
            nfc,
            recorder,
            tx,
            registrations: Mutex::new(Vec::new()),
        }
    }

    pub fn capability_name(&self) -> &str {
        self.nfc.name()
    }

    /// Start the I/O for `effect`. Returns immediately; results arrive later
    /// on the action channel. Must be called from within a tokio runtime.
    pub fn execute(&self, effect: Effect) {
        match effect {
            Effect::None | Effect::Quit { .. } => {}
            Effect::Probe { epoch, release } => self.spawn_probe(epoch, release),
            Effect::RegisterListener { epoch } => self.spawn_register(epoch),
            Effect::ReleaseListener(listener) => self.spawn_release(listener),
            Effect::ConsumeTag { listener, uid } => self.spawn_consume(listener, uid),
            Effect::OpenSettings => self.spawn_settings(),
            Effect::SendTag { seq, tag_id } => self.spawn_send(seq, tag_id),
            Effect::ScheduleReturn { token, delay } => self.spawn_return_timer(token, delay),
        }
    }

    /// Apply every queued action, executing the resulting effects.
    pub fn drain(&self, scanner: &mut Scanner, rx: &mpsc::Receiver<Action>) -> Drained {
        let mut drained = Drained::default();
        while let Ok(action) = rx.try_recv() {
            debug!("Event loop received: {:?}", action);
            drained.handled += 1;
            let effect = update(scanner, action);
            if let Effect::Quit { release } = effect {
                drained.quit = true;
                drained.release = release;
                break;
            }
            self.execute(effect);
        }
        drained
    }

    /// Release every listener before exit: the active one, plus any whose
    /// registration was still in flight or not yet drained when `Quit` came.
    pub async fn shutdown(&self, release: Option<ListenerId>, rx: &mpsc::Receiver<Action>) {
        if let Some(listener) = release {
            self.release_on_shutdown(listener).await;
        }

        let pending = std::mem::take(
            &mut *self
                .registrations
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for task in pending {
            if let Err(e) = task.await {
                warn!("Registration task failed during shutdown: {e}");
            }
        }

        while let Ok(action) = rx.try_recv() {
            if let Action::ListenerRegistered { listener, .. } = action {
                self.release_on_shutdown(listener).await;
            }
        }
    }

    async fn release_on_shutdown(&self, listener: ListenerId) {
        match self.nfc.remove_tag_discovered_listener(listener).await {
            Ok(()) => info!("Released {listener} on shutdown"),
            Err(e) => warn!("Failed to release {listener} on shutdown: {e}"),
        }
    }

    fn spawn_probe(&self, epoch: u64, release: Option<ListenerId>) {
        let nfc = self.nfc.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Some(listener) = release {
                if let Err(e) = nfc.remove_tag_discovered_listener(listener).await {
                    warn!("Failed to release {listener} before re-probe: {e}");
                }
            }
            let present = nfc.is_present().await;
            info!("NFC capability '{}' present: {present}", nfc.name());
            dispatch(&tx, Action::CapabilityChecked { epoch, present });
        });
    }

    fn spawn_register(&self, epoch: u64) {
        let nfc = self.nfc.clone();
        let tx = self.tx.clone();
        let handler_tx = self.tx.clone();
        let handler: TagHandler = Arc::new(move |event| {
            debug!("Tag discovered on {} ({} bytes)", event.listener, event.uid.len());
            dispatch(&handler_tx, Action::TagDiscovered(event));
        });
        let task = tokio::spawn(async move {
            let action = match nfc.add_tag_discovered_listener(handler).await {
                Ok(listener) => {
                    info!("Registered tag listener {listener}");
                    Action::ListenerRegistered { epoch, listener }
                }
                Err(e) => Action::ListenerFailed {
                    epoch,
                    reason: e.to_string(),
                },
            };
            dispatch(&tx, action);
        });
        let mut registrations = self
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        registrations.retain(|task| !task.is_finished());
        registrations.push(task);
    }

    fn spawn_release(&self, listener: ListenerId) {
        let nfc = self.nfc.clone();
        tokio::spawn(async move {
            match nfc.remove_tag_discovered_listener(listener).await {
                Ok(()) => debug!("Released {listener}"),
                Err(e) => warn!("Failed to release {listener}: {e}"),
            }
        });
    }

    fn spawn_consume(&self, listener: ListenerId, uid: Vec<u8>) {
        let nfc = self.nfc.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // Unregister first: the identifier is only published once the
            // listener can no longer fire.
            if let Err(e) = nfc.remove_tag_discovered_listener(listener).await {
                warn!("Failed to release {listener} after discovery: {e}");
            }
            let tag_id = nfc.bytes_to_hex_string(&uid);
            dispatch(&tx, Action::TagDecoded(tag_id));
        });
    }

    fn spawn_settings(&self) {
        let nfc = self.nfc.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let action = match nfc.show_settings().await {
                Ok(()) => Action::SettingsOpened,
                Err(e) => Action::SettingsFailed(e.to_string()),
            };
            dispatch(&tx, action);
        });
    }

    fn spawn_send(&self, seq: u64, tag_id: String) {
        let recorder = self.recorder.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = recorder.record(&tag_id).await;
            dispatch(
                &tx,
                Action::SendFinished {
                    seq,
                    tag_id,
                    result,
                    at: Local::now().time(),
                },
            );
        });
    }

    fn spawn_return_timer(&self, token: u64, delay: Duration) {
        let tx = self.tx.clone();
        debug!("Return timer {token} armed for {delay:?}");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            dispatch(&tx, Action::ReturnTimerElapsed(token));
        });
    }
}
