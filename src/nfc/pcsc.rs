//! # PC/SC Reader
//!
//! Contactless readers exposed through PC/SC (ACR122U and friends).
//!
//! - Present when a PC/SC context can be established (the service runs).
//! - Registration fails as "disabled" when no matching reader is attached.
//! - Each listener owns a poller thread that waits for card arrival and
//!   reads the UID with the GET DATA pseudo-APDU.
//! - There is no settings screen to open.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use pcsc::{Context, Protocols, ReaderState, Scope, ShareMode, State};

use super::capability::{ListenerId, NfcCapability, NfcError, TagEvent, TagHandler};

/// GET DATA (UID) pseudo-APDU understood by PC/SC contactless readers.
const GET_UID_APDU: [u8; 5] = [0xFF, 0xCA, 0x00, 0x00, 0x00];

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct PcscReader {
    reader_filter: Option<String>,
    next_listener: AtomicU64,
    pollers: Mutex<HashMap<ListenerId, Arc<AtomicBool>>>,
}

impl PcscReader {
    pub fn new(reader_filter: Option<String>) -> Self {
        Self {
            reader_filter,
            next_listener: AtomicU64::new(1),
            pollers: Mutex::new(HashMap::new()),
        }
    }
}

fn find_reader(context: &Context, filter: Option<&str>) -> Result<CString, NfcError> {
    let readers = match context.list_readers_owned() {
        Ok(readers) => readers,
        Err(pcsc::Error::NoReadersAvailable) => Vec::new(),
        Err(e) => return Err(NfcError::Disabled(e.to_string())),
    };
    readers
        .into_iter()
        .find(|name| match filter {
            Some(filter) => name.to_string_lossy().contains(filter),
            None => true,
        })
        .ok_or_else(|| NfcError::Disabled("no contactless reader attached".to_string()))
}

/// Establish a context and pick the reader. Both calls block on pcscd.
fn open_reader(filter: Option<&str>) -> Result<(Context, CString), NfcError> {
    let context = Context::establish(Scope::User).map_err(|_| NfcError::Unavailable)?;
    let reader = find_reader(&context, filter)?;
    Ok((context, reader))
}

/// Split a GET DATA response into the UID, checking the `90 00` status word.
pub fn parse_uid_response(response: &[u8]) -> Result<Vec<u8>, NfcError> {
    match response {
        [uid @ .., 0x90, 0x00] if !uid.is_empty() => Ok(uid.to_vec()),
        [.., sw1, sw2] => Err(NfcError::Reader(format!(
            "GET DATA failed with status {sw1:02X}{sw2:02X}"
        ))),
        _ => Err(NfcError::Reader("short GET DATA response".to_string())),
    }
}

fn read_uid(context: &Context, reader: &CStr) -> Result<Vec<u8>, NfcError> {
    let card = context
        .connect(reader, ShareMode::Shared, Protocols::ANY)
        .map_err(|e| NfcError::Reader(e.to_string()))?;
    let mut buffer = [0u8; pcsc::MAX_BUFFER_SIZE];
    let response = card
        .transmit(&GET_UID_APDU, &mut buffer)
        .map_err(|e| NfcError::Reader(e.to_string()))?;
    parse_uid_response(response)
}

fn poll_reader(
    context: Context,
    reader: CString,
    listener: ListenerId,
    handler: TagHandler,
    stop: Arc<AtomicBool>,
) {
    let mut states = vec![ReaderState::new(reader.clone(), State::UNAWARE)];
    let mut card_was_present = false;

    while !stop.load(Ordering::Acquire) {
        match context.get_status_change(POLL_INTERVAL, &mut states) {
            Ok(()) => {}
            Err(pcsc::Error::Timeout) => continue,
            Err(e) => {
                warn!("PC/SC poller for {listener} stopped: {e}");
                return;
            }
        }
        let state = states[0].event_state();
        states[0].sync_current_state();

        let present = state.contains(State::PRESENT);
        if present && !card_was_present {
            match read_uid(&context, &reader) {
                Ok(uid) if !stop.load(Ordering::Acquire) => {
                    handler(TagEvent { listener, uid });
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to read tag UID: {e}"),
            }
        }
        card_was_present = present;
    }
    debug!("PC/SC poller for {listener} exited");
}

#[async_trait]
impl NfcCapability for PcscReader {
    fn name(&self) -> &str {
        "pcsc"
    }

    async fn is_present(&self) -> bool {
        let established = tokio::task::spawn_blocking(|| Context::establish(Scope::User)).await;
        match established {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                info!("PC/SC unavailable: {e}");
                false
            }
            Err(e) => {
                warn!("PC/SC presence check did not complete: {e}");
                false
            }
        }
    }

    async fn add_tag_discovered_listener(
        &self,
        handler: TagHandler,
    ) -> Result<ListenerId, NfcError> {
        let filter = self.reader_filter.clone();
        let (context, reader) = tokio::task::spawn_blocking(move || open_reader(filter.as_deref()))
            .await
            .map_err(|e| NfcError::Reader(e.to_string()))??;
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        let stop = Arc::new(AtomicBool::new(false));

        info!("Polling {} for tags ({id})", reader.to_string_lossy());
        let poller_stop = stop.clone();
        thread::Builder::new()
            .name(format!("pcsc-{}", id.0))
            .spawn(move || poll_reader(context, reader, id, handler, poller_stop))
            .map_err(|e| NfcError::Reader(e.to_string()))?;

        self.pollers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, stop);
        Ok(id)
    }

    async fn remove_tag_discovered_listener(&self, listener: ListenerId) -> Result<(), NfcError> {
        let stop = self
            .pollers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&listener)
            .ok_or(NfcError::UnknownListener(listener))?;
        stop.store(true, Ordering::Release);
        Ok(())
    }

    async fn show_settings(&self) -> Result<(), NfcError> {
        Err(NfcError::Settings(
            "PC/SC readers have no settings screen; attach a reader and initialize again"
                .to_string(),
        ))
    }
}
