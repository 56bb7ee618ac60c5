use crate::codec::{self, detect_image_mime};
use crate::models::{DetectionMode, UploadedImage};
use crate::{Error, Result};
use reqwest::multipart::{Form, Part};

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// A single POST to one detection endpoint for one image.
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub url: String,
    pub mode: DetectionMode,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DetectionRequest {
    pub fn build(base_url: &str, mode: DetectionMode, image: &UploadedImage) -> Result<Self> {
        let bytes = codec::encode(image);
        if bytes.is_empty() {
            return Err(Error::InvalidUpload(format!(
                "{} is empty",
                image.file_name
            )));
        }

        Ok(Self {
            url: format!("{}{}", base_url.trim_end_matches('/'), mode.path()),
            mode,
            file_name: image.file_name.clone(),
            content_type: image.content_type.clone(),
            bytes: bytes.to_vec(),
        })
    }

    /// Declared content type, or the sniffed one when the browser sent none
    /// or a generic one such as `application/octet-stream`.
    pub fn effective_content_type(&self) -> &str {
        let declared = self.content_type.trim();
        if declared.is_empty() || is_generic_content_type(declared) {
            detect_image_mime(&self.bytes)
        } else {
            &self.content_type
        }
    }

    pub fn into_form(self) -> Result<Form> {
        let mime = self.effective_content_type().to_string();
        let part = Part::bytes(self.bytes).file_name(self.file_name);
        let part = match part.mime_str(&mime) {
            Ok(part) => part,
            Err(e) => {
                tracing::warn!("Unusable content type '{}': {}", mime, e);
                return Err(Error::InvalidUpload(format!(
                    "unusable content type '{}'",
                    mime
                )));
            }
        };
        Ok(Form::new().part(FILE_FIELD, part))
    }
}

fn is_generic_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    essence.eq_ignore_ascii_case("application/octet-stream")
        || essence.eq_ignore_ascii_case("binary/octet-stream")
}
