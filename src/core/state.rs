//! # Scanner State
//!
//! Everything the tag scanner knows, in one place. No I/O handles live here;
//! the NFC capability and the HTTP client belong to the runtime.
//!
//! ```text
//! Scanner
//! ├── step: Step                    // current named state
//! ├── tag_id: String                // last read tag (hex), "" until a scan
//! ├── send_status: String           // last send outcome message
//! ├── alert: Option<String>         // blocking alert (settings failure)
//! ├── listener: Option<ListenerId>  // the one active tag listener
//! ├── epoch: u64                    // bumped on every initialization
//! ├── sending: bool                 // HTTP send in flight
//! ├── send_seq: u64                 // id of the send whose result counts
//! ├── pending_return: Option<u64>   // token of the armed return timer
//! ├── return_delay: Duration        // send → re-initialize delay
//! └── messages: MessageTemplates    // send-status wording
//! ```
//!
//! State changes only happen through `update(scanner, action)` in action.rs.

use std::time::Duration;

use crate::core::config::ResolvedConfig;
use crate::core::messages::MessageTemplates;
use crate::core::step::Step;
use crate::nfc::ListenerId;

#[derive(Debug, Clone)]
pub struct Scanner {
    pub step: Step,
    pub tag_id: String,
    pub send_status: String,
    pub alert: Option<String>,
    pub listener: Option<ListenerId>,
    /// Results tagged with an older epoch belong to an abandoned probe.
    pub epoch: u64,
    pub sending: bool,
    /// Results of any other send are dropped.
    pub send_seq: u64,
    pub pending_return: Option<u64>,
    pub(crate) next_timer: u64,
    pub return_delay: Duration,
    pub messages: MessageTemplates,
}

impl Scanner {
    pub fn new(return_delay: Duration, messages: MessageTemplates) -> Self {
        Self {
            step: Step::Initializing,
            tag_id: String::new(),
            send_status: messages.not_sent.clone(),
            alert: None,
            listener: None,
            epoch: 0,
            sending: false,
            send_seq: 0,
            pending_return: None,
            next_timer: 0,
            return_delay,
            messages,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.return_delay, config.messages.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_scanner;

    use super::*;

    #[test]
    fn test_scanner_new_defaults() {
        let scanner = test_scanner();
        assert_eq!(scanner.step, Step::Initializing);
        assert!(scanner.tag_id.is_empty());
        assert_eq!(scanner.send_status, "Not sent yet");
        assert!(scanner.listener.is_none());
        assert!(scanner.alert.is_none());
        assert_eq!(scanner.return_delay, Duration::from_secs(3));
    }
}
