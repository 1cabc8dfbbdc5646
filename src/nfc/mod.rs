//! # NFC Capability
//!
//! The scanner never talks to NFC hardware directly. It is handed an
//! `Arc<dyn NfcCapability>` at construction time and only ever calls the
//! five operations on that trait.
//!
//! ```text
//!   core::update()  ──Effect──►  runtime  ──calls──►  dyn NfcCapability
//!         ▲                                               │
//!         └──────────────Action (TagDiscovered …)─────────┘
//! ```
//!
//! ## Backends
//!
//! - [`SimulatedReader`]: in-process reader driven from the keyboard. Also the
//!   test double used by the integration tests.
//! - [`Unavailable`]: no reader at all. The scanner lands in `NoNfc`.
//! - `PcscReader`: PC/SC contactless reader, behind the `pcsc` cargo feature.

pub mod capability;
pub mod hex;
#[cfg(feature = "pcsc")]
pub mod pcsc;
pub mod simulated;

pub use capability::{ListenerId, NfcCapability, NfcError, TagEvent, TagHandler};
pub use simulated::{ReaderCall, SimulatedReader};

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use crate::ReaderKind;
use crate::core::config::ResolvedConfig;

/// Capability for a device without any usable reader.
pub struct Unavailable;

#[async_trait]
impl NfcCapability for Unavailable {
    fn name(&self) -> &str {
        "none"
    }

    async fn is_present(&self) -> bool {
        false
    }

    async fn add_tag_discovered_listener(
        &self,
        _handler: TagHandler,
    ) -> Result<ListenerId, NfcError> {
        Err(NfcError::Unavailable)
    }

    async fn remove_tag_discovered_listener(&self, _listener: ListenerId) -> Result<(), NfcError> {
        Err(NfcError::Unavailable)
    }

    async fn show_settings(&self) -> Result<(), NfcError> {
        Err(NfcError::Unavailable)
    }
}

/// The capability the scanner runs against, plus a handle to the simulator
/// when that backend is selected (the TUI uses it to fake tag taps).
pub struct Backend {
    pub capability: Arc<dyn NfcCapability>,
    pub simulator: Option<Arc<SimulatedReader>>,
}

/// Build the NFC backend selected by the resolved config.
pub fn build_backend(config: &ResolvedConfig) -> Backend {
    match config.reader {
        ReaderKind::Simulated => {
            let reader = Arc::new(SimulatedReader::from_settings(&config.simulator));
            info!(
                "Using simulated reader ({} configured tags)",
                config.simulator.tags.len()
            );
            Backend {
                capability: reader.clone(),
                simulator: Some(reader),
            }
        }
        ReaderKind::Pcsc => build_pcsc(config),
    }
}

#[cfg(feature = "pcsc")]
fn build_pcsc(config: &ResolvedConfig) -> Backend {
    info!("Using PC/SC reader (filter: {:?})", config.pcsc_reader);
    Backend {
        capability: Arc::new(pcsc::PcscReader::new(config.pcsc_reader.clone())),
        simulator: None,
    }
}

#[cfg(not(feature = "pcsc"))]
fn build_pcsc(_config: &ResolvedConfig) -> Backend {
    warn!("PC/SC backend requested but this build lacks the `pcsc` feature");
    Backend {
        capability: Arc::new(Unavailable),
        simulator: None,
    }
}
