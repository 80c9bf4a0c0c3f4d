//! Post content rules and upload sniffing.

use image::ImageFormat;

use crate::error::CoreError;

/// Maximum post body length in characters.
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// Image formats accepted for post uploads.
const ACCEPTED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// Validate a post body: required, not blank, bounded length.
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation("Content is required".into()));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Content must be at most {MAX_CONTENT_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Identify an uploaded image from its magic bytes.
///
/// Only the header is inspected; nothing is decoded. Returns the MIME type of
/// the detected format.
pub fn sniff_image(bytes: &[u8]) -> Result<&'static str, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Validation("Image is required".into()));
    }
    let format = image::guess_format(bytes)
        .map_err(|_| CoreError::Validation("Image must be a PNG, JPEG, or WebP file".into()))?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(CoreError::Validation(
            "Image must be a PNG, JPEG, or WebP file".into(),
        ));
    }
    Ok(format.to_mime_type())
}
