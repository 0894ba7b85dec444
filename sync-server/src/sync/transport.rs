//! Webhook transport seam
//!
//! One-method POST interface so the notifier can be driven against a
//! recording mock in tests. The reqwest implementation is the only
//! production transport; a transport-level `Err` means the request never
//! produced an HTTP response (connect failure, timeout).

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use shared::error::{AppError, AppResult};

/// Raw HTTP response as the notifier needs it: status plus body text
#[derive(Debug, Clone)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// POST a JSON body with the given headers; Err only on transport failure
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> AppResult<WebhookResponse>;
}

/// Production transport backed by a shared reqwest client
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the given total request timeout
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> AppResult<WebhookResponse> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::webhook_transport(format!("Webhook request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(WebhookResponse { status, body })
    }
}
