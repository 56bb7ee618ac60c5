//! Analysis orchestration: one request per uploaded image, one panel per
//! request.

use crate::codec::mime::is_accepted_upload;
use crate::config::Config;
use crate::detection::{
    self, DetectionClient, DetectionRequest, DetectionService, MockDetectionClient,
};
use crate::models::{DetectionMode, DetectionResult, Panel, PanelOutcome, UploadedImage};
use crate::Result;
use tracing::{info, warn};

/// Runs analysis batches against the detection service.
pub struct App {
    detection: Box<dyn DetectionService>,
    base_url: String,
}

impl App {
    /// Build an app from a concrete detection service.
    ///
    /// Integration tests use this to inject [`MockDetectionClient`].
    pub fn with_services(detection: Box<dyn DetectionService>, base_url: String) -> Self {
        Self {
            detection,
            base_url,
        }
    }

    /// Construct from configuration. With `offline` set, no request leaves
    /// the process and every image gets the placeholder demo answer.
    pub fn from_config(config: &Config, offline: bool) -> Self {
        let detection: Box<dyn DetectionService> = if offline {
            info!("Offline mode enabled, detection requests will be answered locally");
            Box::new(MockDetectionClient::new())
        } else {
            info!("Detection service: {}", config.base_url());
            Box::new(DetectionClient::new())
        };

        Self::with_services(detection, config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Analyze every upload in order. Each upload yields exactly one panel;
    /// a failing image never stops the rest of the run.
    pub async fn analyze(&self, mode: DetectionMode, uploads: Vec<UploadedImage>) -> Vec<Panel> {
        info!(
            "Analyzing {} image(s) with {} ({})",
            uploads.len(),
            mode.label(),
            mode.path()
        );

        let mut panels = Vec::with_capacity(uploads.len());
        for (index, upload) in uploads.into_iter().enumerate() {
            let outcome = match self.analyze_one(mode, &upload).await {
                Ok(result) => PanelOutcome::Ready(result),
                Err(e) => {
                    warn!("[{}] {} failed: {}", index, upload.file_name, e);
                    PanelOutcome::Failed(e.to_string())
                }
            };
            panels.push(Panel {
                index,
                upload,
                outcome,
            });
        }
        panels
    }

    async fn analyze_one(
        &self,
        mode: DetectionMode,
        upload: &UploadedImage,
    ) -> Result<DetectionResult> {
        if !is_accepted_upload(&upload.file_name, &upload.content_type, &upload.bytes) {
            return Err(crate::Error::InvalidUpload(format!(
                "{} has unsupported type '{}' (png, jpg or jpeg expected)",
                upload.file_name, upload.content_type
            )));
        }

        let request = DetectionRequest::build(&self.base_url, mode, upload)?;
        let response = self.detection.send(request).await?;
        let result = detection::parse(&response.body, mode)?;

        info!(
            "{} analyzed (status {}, annotated image: {})",
            upload.file_name,
            response.status,
            result.primary_image.is_some()
        );
        Ok(result)
    }
}
