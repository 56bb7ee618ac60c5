//! Form payloads posted by the console pages

use crate::models::{DetectionMode, UploadedImage};
use crate::{Error, Result};
use axum::extract::Multipart;
use serde::Deserialize;

/// Login form (urlencoded)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Analyze form (multipart): the selected mode plus the files in the order
/// the browser sent them.
#[derive(Debug)]
pub struct AnalyzeForm {
    pub mode: Option<String>,
    pub files: Vec<UploadedImage>,
}

impl AnalyzeForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut mode = None;
        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Error::InvalidUpload(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "mode" => {
                    mode = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| Error::InvalidUpload(e.to_string()))?,
                    );
                }
                "files" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let content_type = field.content_type().unwrap_or("").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| Error::InvalidUpload(e.to_string()))?;

                    // An empty file input still posts one nameless, empty part.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    files.push(UploadedImage::new(file_name, content_type, bytes.to_vec()));
                }
                other => {
                    tracing::debug!("Ignoring unexpected form field '{}'", other);
                }
            }
        }

        Ok(Self { mode, files })
    }

    pub fn detection_mode(&self) -> Result<DetectionMode> {
        let path = self
            .mode
            .as_deref()
            .ok_or_else(|| Error::InvalidUpload("no detection method selected".to_string()))?;
        DetectionMode::from_path(path.trim())
            .ok_or_else(|| Error::InvalidUpload(format!("unknown detection method '{}'", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_mode_lookup() {
        let form = AnalyzeForm {
            mode: Some("/detect/axis_system".to_string()),
            files: Vec::new(),
        };
        assert_eq!(form.detection_mode().unwrap(), DetectionMode::AxisSystem);

        let unknown = AnalyzeForm {
            mode: Some("/detect/everything".to_string()),
            files: Vec::new(),
        };
        assert!(matches!(
            unknown.detection_mode().unwrap_err(),
            Error::InvalidUpload(_)
        ));

        let missing = AnalyzeForm {
            mode: None,
            files: Vec::new(),
        };
        assert!(missing.detection_mode().is_err());
    }
}
