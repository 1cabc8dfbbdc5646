use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use uuid::Uuid;

use super::types::{ApiError, RideRecord, SendReceipt};

/// Anything that can record a ride for a member id.
#[async_trait]
pub trait RideRecorder: Send + Sync {
    /// Submit one ride record. `Ok` carries whatever status the endpoint
    /// answered with; only transport failures are `Err`.
    async fn record(&self, member_id: &str) -> Result<SendReceipt, ApiError>;
}

/// Posts ride records as `application/x-www-form-urlencoded`.
pub struct RideRecordClient {
    endpoint: String,
    device_id: String,
    client: reqwest::Client,
}

impl RideRecordClient {
    pub fn new(endpoint: String, device_id: Uuid, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            endpoint,
            device_id: device_id.to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RideRecorder for RideRecordClient {
    async fn record(&self, member_id: &str) -> Result<SendReceipt, ApiError> {
        let form = RideRecord {
            member_id,
            device: &self.device_id,
        };
        info!("POST {} (member_id={})", self.endpoint, member_id);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!("Ride record request failed: {e}");
                ApiError::Network(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read ride record response body: {e}");
                String::new()
            }
        };
        let receipt = SendReceipt { status, body };

        if receipt.is_created() {
            info!(
                "Ride record created (HTTP {status}, id={})",
                receipt.record_id().as_deref().unwrap_or("?")
            );
        } else {
            warn!("Ride record not created (HTTP {status})");
        }
        debug!("Response body: {}", receipt.body);
        Ok(receipt)
    }
}
