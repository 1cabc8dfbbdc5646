//! # Step
//!
//! The finite set of named states the scanner can be in. Exactly one is
//! active at any time.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Probing the capability / waiting for listener registration.
    #[default]
    Initializing,
    /// No NFC on this device. Terminal until restart.
    NoNfc,
    /// NFC present but switched off.
    NfcNotEnabled,
    /// Settings were opened; waiting for the user to come back.
    WaitingForNfcEnabled,
    /// Listener registered, waiting for a tag.
    WaitingForTag,
    /// User stopped the reader. Terminal.
    Cancelled,
    /// A tag was read and its identifier stored.
    TagRead,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Initializing,
        Step::NoNfc,
        Step::NfcNotEnabled,
        Step::WaitingForNfcEnabled,
        Step::WaitingForTag,
        Step::Cancelled,
        Step::TagRead,
    ];

    /// Steps with no way out short of restarting the app.
    pub fn is_terminal(self) -> bool {
        matches!(self, Step::NoNfc | Step::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Initializing => "Initializing",
            Step::NoNfc => "No NFC",
            Step::NfcNotEnabled => "NFC disabled",
            Step::WaitingForNfcEnabled => "Waiting for NFC",
            Step::WaitingForTag => "Waiting for tag",
            Step::Cancelled => "Stopped",
            Step::TagRead => "Tag read",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
