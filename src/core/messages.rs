//! # Send-status Messages
//!
//! Templates for the status line shown under a read tag. Placeholders:
//!
//! | Placeholder | Value |
//! |---|---|
//! | `{id}` | the tag identifier that was sent |
//! | `{status}` | HTTP status code (empty for network failures) |
//! | `{reason}` | `HTTP 400`, `network error: …`, … |
//! | `{delay}` | seconds until scanning resumes |
//! | `{time}` | local `HH:MM:SS` of the outcome |

use std::time::Duration;

use chrono::NaiveTime;

use crate::api::{ApiError, SendReceipt};

pub const DEFAULT_NOT_SENT: &str = "Not sent yet";
pub const DEFAULT_SENT: &str = "Sent: {id} (HTTP {status})\nReturning in {delay}s";
pub const DEFAULT_FAILED: &str = "Send failed: {id} ({reason})\nReturning in {delay}s";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    pub not_sent: String,
    pub sent: String,
    pub failed: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            not_sent: DEFAULT_NOT_SENT.to_string(),
            sent: DEFAULT_SENT.to_string(),
            failed: DEFAULT_FAILED.to_string(),
        }
    }
}

impl MessageTemplates {
    /// Render the status line for a finished send.
    pub fn outcome(
        &self,
        tag_id: &str,
        result: &Result<SendReceipt, ApiError>,
        delay: Duration,
        at: NaiveTime,
    ) -> String {
        let (template, status, reason) = match result {
            Ok(receipt) if receipt.is_created() => {
                (&self.sent, receipt.status.to_string(), "created".to_string())
            }
            Ok(receipt) => (
                &self.failed,
                receipt.status.to_string(),
                format!("HTTP {}", receipt.status),
            ),
            Err(e) => (&self.failed, String::new(), e.to_string()),
        };
        let delay = format_delay(delay);
        let time = at.format("%H:%M:%S").to_string();
        fill(
            template,
            &[
                ("id", tag_id),
                ("status", &status),
                ("reason", &reason),
                ("delay", &delay),
                ("time", &time),
            ],
        )
    }
}

/// Whole seconds print without a fraction, anything else with one decimal.
pub fn format_delay(delay: Duration) -> String {
    if delay.subsec_millis() == 0 {
        delay.as_secs().to_string()
    } else {
        format!("{:.1}", delay.as_secs_f32())
    }
}

fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("{{{key}}}"), value)
        })
}
