use super::{DetectionRequest, DetectionService, RawResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

/// reqwest-backed client for the detection service.
///
/// No timeout or retry policy is configured; a request waits for whatever
/// the transport does by default.
pub struct DetectionClient {
    client: Client,
}

impl DetectionClient {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for DetectionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DetectionService for DetectionClient {
    async fn send(&self, request: DetectionRequest) -> Result<RawResponse> {
        let url = request.url.clone();
        tracing::debug!(
            "Posting {} ({} bytes) to {}",
            request.file_name,
            request.bytes.len(),
            url
        );

        let form = request.into_form()?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to detection service: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Detection service error (status {}): {}", status, body);
            return Err(Error::Service {
                status: status.as_u16(),
                body,
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}
