//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::mpsc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveTime;

use crate::api::{ApiError, RideRecorder, SendReceipt};
use crate::core::action::Action;
use crate::core::messages::MessageTemplates;
use crate::core::state::Scanner;
use crate::runtime::Runtime;

/// A recorder that answers every send with a fixed status.
pub struct CannedRecorder {
    status: u16,
}

impl CannedRecorder {
    pub fn new(status: u16) -> Self {
        Self { status }
    }
}

#[async_trait]
impl RideRecorder for CannedRecorder {
    async fn record(&self, member_id: &str) -> Result<SendReceipt, ApiError> {
        Ok(SendReceipt {
            status: self.status,
            body: format!(r#"{{"id": 1, "member_id": "{member_id}"}}"#),
        })
    }
}

/// Creates a scanner with default messages and a 3 s return delay.
pub fn test_scanner() -> Scanner {
    Scanner::new(Duration::from_secs(3), MessageTemplates::default())
}

pub fn at_noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap()
}

/// Drain actions until `done` holds or two seconds pass.
pub async fn pump_until<F>(
    runtime: &Runtime,
    scanner: &mut Scanner,
    rx: &mpsc::Receiver<Action>,
    done: F,
) -> bool
where
    F: Fn(&Scanner) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        runtime.drain(scanner, rx);
        if done(scanner) {
            return true;
        }
        if Instant::now() > deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
