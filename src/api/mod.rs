//! # Ride Record API
//!
//! The single remote endpoint the scanner talks to: a form-encoded POST that
//! creates a ride record for a member id on a given device.

pub mod client;
pub mod types;

pub use client::{RideRecordClient, RideRecorder};
pub use types::{ApiError, RideRecord, SendReceipt};
