use std::fmt;

use serde::{Deserialize, Serialize};

/// Form body of a ride-record POST.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RideRecord<'a> {
    /// The scanned tag identifier (hex).
    pub member_id: &'a str,
    /// Fixed identifier of this scanning device.
    pub device: &'a str,
}

/// What the endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub status: u16,
    pub body: String,
}

/// Subset of the created record we care about for logging.
#[derive(Deserialize, Debug)]
struct CreatedRecord {
    id: serde_json::Value,
}

impl SendReceipt {
    /// Only 201 Created counts as success.
    pub fn is_created(&self) -> bool {
        self.status == 201
    }

    /// The `id` of the created record, when the body is JSON carrying one.
    pub fn record_id(&self) -> Option<String> {
        let record: CreatedRecord = serde_json::from_str(&self.body).ok()?;
        match record.id {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Errors that can occur while sending a ride record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Client misconfigured (bad URL, TLS backend failure).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_201_is_created() {
        let receipt = |status| SendReceipt {
            status,
            body: String::new(),
        };
        assert!(receipt(201).is_created());
        assert!(!receipt(200).is_created());
        assert!(!receipt(400).is_created());
    }

    #[test]
    fn test_record_id_from_json_body() {
        let receipt = SendReceipt {
            status: 201,
            body: r#"{"id": 42, "member_id": "deadbeef"}"#.to_string(),
        };
        assert_eq!(receipt.record_id().as_deref(), Some("42"));

        let receipt = SendReceipt {
            status: 201,
            body: r#"{"id": "abc"}"#.to_string(),
        };
        assert_eq!(receipt.record_id().as_deref(), Some("abc"));
    }

    #[test]
    fn test_record_id_missing() {
        let receipt = SendReceipt {
            status: 201,
            body: "created".to_string(),
        };
        assert_eq!(receipt.record_id(), None);
    }

    #[test]
    fn test_ride_record_field_names() {
        let record = RideRecord {
            member_id: "deadbeef",
            device: "4ac74819-d310-4f74-860b-70dff5063527",
        };
        // Field names become the form keys the endpoint expects.
        let fields = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = fields.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["device", "member_id"]);
        assert_eq!(fields["member_id"], "deadbeef");
    }
}
