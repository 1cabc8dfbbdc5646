//! ridetag library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod core;
pub mod nfc;
pub mod runtime;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Which NFC backend to drive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderKind {
    /// In-process reader; tags are tapped from the keyboard.
    #[default]
    Simulated,
    /// PC/SC contactless reader (needs the `pcsc` feature).
    Pcsc,
}
