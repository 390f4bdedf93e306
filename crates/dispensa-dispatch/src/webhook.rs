//! HTTP webhook dispatch facility.
//!
//! Talks to a reminder relay over plain JSON/HTTP. The relay owns the
//! outstanding-reminder set; this adapter only translates trait calls into
//! requests:
//!
//! ```text
//! probe_availability   GET    {base}/health
//! permission_status    GET    {base}/permissions
//! request_permission   POST   {base}/permissions/request
//! schedule             POST   {base}/reminders
//! cancel               DELETE {base}/reminders/{identifier}
//! list_outstanding     GET    {base}/reminders
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use dispensa_core::config::DispatchConfig;
use dispensa_core::error::{DispensaError, Result};
use dispensa_core::traits::DispatchFacility;
use dispensa_core::types::{
    OutstandingReminder, PermissionOptions, PermissionStatus, ReminderRequest,
};

/// Facility backed by an HTTP reminder relay.
pub struct WebhookFacility {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    available: bool,
}

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    status: PermissionStatus,
}

impl WebhookFacility {
    /// Build a facility from config.
    pub fn new(config: &DispatchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DispensaError::Facility(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl DispatchFacility for WebhookFacility {
    async fn probe_availability(&self) -> Result<bool> {
        let resp = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| DispensaError::Facility(format!("Health probe failed: {e}")))?;
        if !resp.status().is_success() {
            return Ok(false);
        }
        let health: HealthResponse = resp
            .json()
            .await
            .map_err(|e| DispensaError::Serialize(format!("Bad health response: {e}")))?;
        Ok(health.available)
    }

    async fn permission_status(&self) -> Result<PermissionStatus> {
        let resp = self
            .client
            .get(self.url("/permissions"))
            .send()
            .await
            .map_err(|e| DispensaError::Facility(format!("Permission check failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(DispensaError::Permission(format!(
                "Permission check returned {}",
                resp.status()
            )));
        }
        let perm: PermissionResponse = resp
            .json()
            .await
            .map_err(|e| DispensaError::Serialize(format!("Bad permission response: {e}")))?;
        Ok(perm.status)
    }

    async fn request_permission(&self, options: &PermissionOptions) -> Result<PermissionStatus> {
        let resp = self
            .client
            .post(self.url("/permissions/request"))
            .json(options)
            .send()
            .await
            .map_err(|e| DispensaError::Facility(format!("Permission request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(DispensaError::Permission(format!(
                "Permission request returned {}",
                resp.status()
            )));
        }
        let perm: PermissionResponse = resp
            .json()
            .await
            .map_err(|e| DispensaError::Serialize(format!("Bad permission response: {e}")))?;
        Ok(perm.status)
    }

    async fn schedule(&self, request: ReminderRequest) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/reminders"))
            .json(&request)
            .send()
            .await
            .map_err(|e| DispensaError::Facility(format!("Schedule send failed: {e}")))?;
        if resp.status().is_success() {
            tracing::debug!("🔔 Scheduled '{}' at {}", request.identifier, request.fires_at);
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(DispensaError::Dispatch(format!("Relay error {status}: {body}")))
        }
    }

    async fn cancel(&self, identifier: &str) -> Result<()> {
        // Escape the identifier so a '/' or '?' in it stays one path segment.
        let resp = self
            .client
            .delete(self.url(&format!("/reminders/{}", urlencoding::encode(identifier))))
            .send()
            .await
            .map_err(|e| DispensaError::Facility(format!("Cancel send failed: {e}")))?;
        // 404 means the identifier was never scheduled; cancel stays idempotent.
        if resp.status().is_success() || resp.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("🗑️ Cancelled '{identifier}'");
            Ok(())
        } else {
            Err(DispensaError::Dispatch(format!(
                "Relay error {} cancelling '{identifier}'",
                resp.status()
            )))
        }
    }

    async fn list_outstanding(&self) -> Result<Vec<OutstandingReminder>> {
        let resp = self
            .client
            .get(self.url("/reminders"))
            .send()
            .await
            .map_err(|e| DispensaError::Facility(format!("List failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(DispensaError::Facility(format!(
                "List returned {}",
                resp.status()
            )));
        }
        let outstanding: Vec<OutstandingReminder> = resp
            .json()
            .await
            .map_err(|e| DispensaError::Serialize(format!("Bad reminder list: {e}")))?;
        Ok(outstanding)
    }
}
