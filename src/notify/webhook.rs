//! Notifier implementations.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{LeaveDecisionNotification, Notifier, NotifyError};

/// Posts each notification as JSON to a configured URL.
///
/// The response body and status are not inspected; only transport failures
/// are reported.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Client {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Returns the webhook URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &LeaveDecisionNotification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        debug!(
            url = %self.url,
            status = %response.status(),
            employee_code = %notification.employee_id,
            "Leave decision webhook delivered"
        );
        Ok(())
    }
}

/// Writes notifications to the log instead of sending them.
///
/// Used when no webhook URL is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &LeaveDecisionNotification) -> Result<(), NotifyError> {
        info!(
            employee_code = %notification.employee_id,
            status = %notification.status,
            from = %notification.from_date,
            to = %notification.to_date,
            "Leave decision (no webhook configured)"
        );
        Ok(())
    }
}
