use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::hex;

/// Identifies one tag-discovered listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A tag came into range of the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
    /// The registration this event was delivered to.
    pub listener: ListenerId,
    /// Raw UID bytes as reported by the reader.
    pub uid: Vec<u8>,
}

/// Callback invoked by the capability for every discovered tag.
pub type TagHandler = Arc<dyn Fn(TagEvent) + Send + Sync>;

/// Errors reported by an NFC capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NfcError {
    /// No NFC hardware or driver on this device.
    Unavailable,
    /// Hardware exists but is switched off (or no reader is attached).
    Disabled(String),
    /// The listener id was never registered or was already removed.
    UnknownListener(ListenerId),
    /// The settings screen could not be opened.
    Settings(String),
    /// Any other reader failure.
    Reader(String),
}

impl fmt::Display for NfcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NfcError::Unavailable => write!(f, "NFC is not available on this device"),
            NfcError::Disabled(msg) => write!(f, "NFC is disabled: {msg}"),
            NfcError::UnknownListener(id) => write!(f, "unknown {id}"),
            NfcError::Settings(msg) => write!(f, "cannot open NFC settings: {msg}"),
            NfcError::Reader(msg) => write!(f, "reader error: {msg}"),
        }
    }
}

impl std::error::Error for NfcError {}

/// Host-provided access to the NFC hardware.
///
/// Registration reports its outcome through the returned `Result`; discovered
/// tags arrive later through the handler, on whatever thread the backend
/// delivers them from.
#[async_trait]
pub trait NfcCapability: Send + Sync {
    /// Short backend name for the title bar and logs.
    fn name(&self) -> &str;

    /// Whether NFC exists on this device at all.
    async fn is_present(&self) -> bool;

    /// Register a tag-discovered listener. Fails with `NfcError::Disabled`
    /// when NFC is present but switched off.
    async fn add_tag_discovered_listener(&self, handler: TagHandler)
    -> Result<ListenerId, NfcError>;

    /// Unregister a listener. No events are delivered to it afterwards.
    async fn remove_tag_discovered_listener(&self, listener: ListenerId) -> Result<(), NfcError>;

    /// Ask the host to open its NFC settings so the user can enable NFC.
    async fn show_settings(&self) -> Result<(), NfcError>;

    /// Decode a tag UID for display.
    fn bytes_to_hex_string(&self, bytes: &[u8]) -> String {
        hex::bytes_to_hex(bytes)
    }
}
