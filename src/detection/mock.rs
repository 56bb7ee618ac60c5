use super::{DetectionRequest, DetectionService, RawResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockReply {
    Body(String),
    Failure { status: u16, body: String },
}

/// In-memory stand-in for the detection service.
///
/// Queued replies are served in order and cycle. With nothing queued every
/// request is answered with [`MockDetectionClient::demo_body`], which echoes
/// the uploaded image back as the visualization.
#[derive(Clone)]
pub struct MockDetectionClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requested_urls: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockDetectionClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requested_urls: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, body: String) -> Self {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).push(MockReply::Body(body));
        self
    }

    pub fn with_json_response(self, body: serde_json::Value) -> Self {
        self.with_response(body.to_string())
    }

    pub fn with_failure(self, status: u16, body: String) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockReply::Failure { status, body });
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_requested_urls(&self) -> Vec<String> {
        self.requested_urls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Placeholder answer used when running without a detection service.
    pub fn demo_body(request: &DetectionRequest) -> serde_json::Value {
        let image = base64::engine::general_purpose::STANDARD.encode(&request.bytes);
        serde_json::json!({
            "image": image,
            "image_em": image,
            "brand": "Cartier",
            "model": "Ballon Bleu",
            "model_number": "4377",
            "serial_number": "47108BX",
            "axis": "Founded",
            "authentication_verdict": "Filename 1 and Filename 2 are same watch",
            "text": ["Cartier", "Automatic", "Stainless Steel"],
            "screws": [
                { "angle": "30", "id": "S0" },
                { "angle": "40", "id": "S2" },
                { "angle": "65", "id": "S1" }
            ]
        })
    }
}

impl Default for MockDetectionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DetectionService for MockDetectionClient {
    async fn send(&self, request: DetectionRequest) -> Result<RawResponse> {
        let mut count = self.call_count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;

        self.requested_urls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.url.clone());

        let replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        if replies.is_empty() {
            return Ok(RawResponse {
                status: 200,
                body: Self::demo_body(&request).to_string(),
            });
        }

        let index = (*count - 1) % replies.len();
        match &replies[index] {
            MockReply::Body(body) => Ok(RawResponse {
                status: 200,
                body: body.clone(),
            }),
            MockReply::Failure { status, body } => Err(Error::Service {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetectionMode, UploadedImage};

    fn request(mode: DetectionMode) -> DetectionRequest {
        let image = UploadedImage::new("a.png".into(), "image/png".into(), vec![9, 8, 7]);
        DetectionRequest::build("http://mock:1", mode, &image).unwrap()
    }

    #[tokio::test]
    async fn test_mock_default_echoes_upload() {
        let client = MockDetectionClient::new();

        let response = client.send(request(DetectionMode::Text)).await.unwrap();
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(body["image"], "CQgH");
        assert_eq!(body["text"][0], "Cartier");
    }

    #[tokio::test]
    async fn test_mock_custom_responses_cycle() {
        let client = MockDetectionClient::new()
            .with_response("first".to_string())
            .with_failure(500, "boom".to_string());

        let r1 = client.send(request(DetectionMode::Text)).await.unwrap();
        assert_eq!(r1.body, "first");

        let r2 = client.send(request(DetectionMode::Text)).await;
        assert!(matches!(r2, Err(Error::Service { status: 500, .. })));

        let r3 = client.send(request(DetectionMode::Text)).await.unwrap();
        assert_eq!(r3.body, "first");
    }

    #[tokio::test]
    async fn test_mock_records_urls_and_calls() {
        let client = MockDetectionClient::new();

        client.send(request(DetectionMode::Screw)).await.unwrap();
        client.send(request(DetectionMode::Notches)).await.unwrap();

        assert_eq!(client.get_call_count(), 2);
        assert_eq!(
            client.get_requested_urls(),
            vec![
                "http://mock:1/detect/screw".to_string(),
                "http://mock:1/detect/notches".to_string()
            ]
        );
    }
}
