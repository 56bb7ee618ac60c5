//! Detection service integration
//!
//! Builds one multipart request per uploaded image, sends it to the external
//! watch detection service and interprets the JSON it answers with.

pub mod client;
pub mod mock;
pub mod request;
pub mod response;

pub use client::DetectionClient;
pub use mock::MockDetectionClient;
pub use request::DetectionRequest;
pub use response::parse;

use crate::Result;
use async_trait::async_trait;

/// Status and body of a service reply, before interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait DetectionService: Send + Sync {
    async fn send(&self, request: DetectionRequest) -> Result<RawResponse>;
}
