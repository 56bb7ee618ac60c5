//! Image codec adapter
//!
//! Turns base64 image payloads from the detection service into validated
//! in-memory images, and hands uploaded bytes to the request builder
//! untouched.

pub mod mime;

pub use mime::detect_image_mime;

use crate::models::UploadedImage;
use crate::{Error, Result};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;

/// A result image that decoded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub fn to_data_uri(&self) -> String {
        data_uri(self.mime, &self.bytes)
    }
}

/// Decode a base64 payload into a displayable image.
///
/// Whitespace inside the payload and a leading `data:*;base64,` prefix are
/// ignored. Anything that is not base64 or not a known raster format is a
/// [`Error::Decode`].
pub fn decode(payload: &str) -> Result<DecodedImage> {
    let payload = payload
        .split_once(";base64,")
        .filter(|(prefix, _)| prefix.starts_with("data:"))
        .map_or(payload, |(_, data)| data);
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.is_empty() {
        return Err(Error::Decode("empty image payload".to_string()));
    }

    let bytes = STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(&compact))
        .map_err(|e| Error::Decode(format!("invalid base64: {}", e)))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| Error::Decode(format!("unreadable image: {}", e)))?;

    Ok(DecodedImage {
        mime: detect_image_mime(&bytes),
        width: img.width(),
        height: img.height(),
        bytes,
    })
}

/// Bytes sent to the service for an upload. The original format is kept.
pub fn encode(upload: &UploadedImage) -> &[u8] {
    &upload.bytes
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
