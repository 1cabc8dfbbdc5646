//! # Simulated Reader
//!
//! An in-process NFC capability. Tags are "tapped" from the keyboard in the
//! TUI (or directly from tests), and every call made against the reader is
//! journaled so tests can assert on call order.
//!
//! `show_settings()` stands in for the user flipping the NFC switch: it turns
//! the radio on, so the next initialization succeeds.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::{debug, info};

use super::capability::{ListenerId, NfcCapability, NfcError, TagEvent, TagHandler};
use super::hex;
use crate::core::config::SimulatorSettings;

/// One call made against the simulated reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCall {
    CheckPresence,
    Register(ListenerId),
    RegisterRejected,
    Unregister(ListenerId),
    ShowSettings,
    Decode(String),
}

pub struct SimulatedReader {
    present: bool,
    enabled: AtomicBool,
    settings_available: bool,
    tags: Vec<Vec<u8>>,
    next_tag: AtomicUsize,
    next_listener: AtomicU64,
    listeners: Mutex<BTreeMap<ListenerId, TagHandler>>,
    journal: Mutex<Vec<ReaderCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedReader {
    pub fn new(present: bool, enabled: bool) -> Self {
        Self {
            present,
            enabled: AtomicBool::new(enabled),
            settings_available: true,
            tags: Vec::new(),
            next_tag: AtomicUsize::new(0),
            next_listener: AtomicU64::new(1),
            listeners: Mutex::new(BTreeMap::new()),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn from_settings(settings: &SimulatorSettings) -> Self {
        Self::new(settings.present, settings.enabled)
            .with_tags(settings.tags.clone())
            .with_settings_available(settings.settings_available)
    }

    pub fn with_tags(mut self, tags: Vec<Vec<u8>>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_settings_available(mut self, available: bool) -> Self {
        self.settings_available = available;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Number of listeners currently registered.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Snapshot of every call made so far.
    pub fn journal(&self) -> Vec<ReaderCall> {
        lock(&self.journal).clone()
    }

    /// Tap the next configured tag (round-robin). Returns the UID tapped, or
    /// `None` when no tags are configured.
    pub fn tap(&self) -> Option<Vec<u8>> {
        if self.tags.is_empty() {
            return None;
        }
        let index = self.next_tag.fetch_add(1, Ordering::Relaxed) % self.tags.len();
        let uid = self.tags[index].clone();
        self.tap_uid(&uid);
        Some(uid)
    }

    /// Deliver a tag with the given UID to every registered listener.
    /// Returns how many listeners received it.
    pub fn tap_uid(&self, uid: &[u8]) -> usize {
        // Clone handlers out so a handler may call back into the reader.
        let handlers: Vec<(ListenerId, TagHandler)> = lock(&self.listeners)
            .iter()
            .map(|(id, handler)| (*id, handler.clone()))
            .collect();
        debug!(
            "Simulated tap {} delivered to {} listener(s)",
            hex::bytes_to_hex(uid),
            handlers.len()
        );
        for (listener, handler) in &handlers {
            handler(TagEvent {
                listener: *listener,
                uid: uid.to_vec(),
            });
        }
        handlers.len()
    }

    fn record(&self, call: ReaderCall) {
        lock(&self.journal).push(call);
    }
}

#[async_trait]
impl NfcCapability for SimulatedReader {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn is_present(&self) -> bool {
        self.record(ReaderCall::CheckPresence);
        self.present
    }

    async fn add_tag_discovered_listener(
        &self,
        handler: TagHandler,
    ) -> Result<ListenerId, NfcError> {
        if !self.present {
            self.record(ReaderCall::RegisterRejected);
            return Err(NfcError::Unavailable);
        }
        if !self.is_enabled() {
            self.record(ReaderCall::RegisterRejected);
            return Err(NfcError::Disabled("simulated radio is off".to_string()));
        }
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).insert(id, handler);
        self.record(ReaderCall::Register(id));
        debug!("Simulated reader registered {id}");
        Ok(id)
    }

    async fn remove_tag_discovered_listener(&self, listener: ListenerId) -> Result<(), NfcError> {
        let removed = lock(&self.listeners).remove(&listener);
        match removed {
            Some(_) => {
                self.record(ReaderCall::Unregister(listener));
                debug!("Simulated reader removed {listener}");
                Ok(())
            }
            None => Err(NfcError::UnknownListener(listener)),
        }
    }

    async fn show_settings(&self) -> Result<(), NfcError> {
        self.record(ReaderCall::ShowSettings);
        if !self.settings_available {
            return Err(NfcError::Settings(
                "simulated settings screen is unavailable".to_string(),
            ));
        }
        info!("Simulated NFC settings opened; radio switched on");
        self.set_enabled(true);
        Ok(())
    }

    fn bytes_to_hex_string(&self, bytes: &[u8]) -> String {
        let hex = hex::bytes_to_hex(bytes);
        self.record(ReaderCall::Decode(hex.clone()));
        hex
    }
}
