use std::path::Path;

const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Image type from the leading bytes, if it is one we know.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x42, 0x4D, ..] => Some("image/bmp"),
        _ => None,
    }
}

/// Sniff the image type from its leading bytes.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    sniff_image_mime(bytes).unwrap_or_else(|| {
        tracing::warn!(
            "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
            &bytes[..bytes.len().min(4)]
        );
        "image/png"
    })
}

/// Declared type usable as a png/jpeg part, ignoring parameters and case.
pub fn is_image_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("");
    matches!(
        essence.trim().to_ascii_lowercase().as_str(),
        "image/png" | "image/jpeg" | "image/jpg" | "image/pjpeg"
    )
}

/// Whether the console accepts an upload: a png/jpg/jpeg file name, a
/// png/jpeg content type, or bytes that sniff as png/jpeg.
pub fn is_accepted_upload(file_name: &str, content_type: &str, bytes: &[u8]) -> bool {
    let by_extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        });

    by_extension
        || is_image_content_type(content_type)
        || matches!(sniff_image_mime(bytes), Some("image/png" | "image/jpeg"))
}
