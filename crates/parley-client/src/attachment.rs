//! Image attachments, inlined into messages as `data:` URIs.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parley_shared::constants::MAX_IMAGE_SIZE;
use parley_shared::ValidationError;

use crate::error::Result;

fn mime_for(path: &Path) -> std::result::Result<&'static str, ValidationError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "svg" => Ok("image/svg+xml"),
        "bmp" => Ok("image/bmp"),
        _ => Err(ValidationError::UnsupportedImageType { extension: ext }),
    }
}

/// Encode raw image bytes as a data URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read an image from disk and inline it. Files over 5 MiB are refused
/// before being read.
pub async fn load_image(path: &Path) -> Result<String> {
    let mime = mime_for(path)?;

    let size = tokio::fs::metadata(path).await?.len();
    if size > MAX_IMAGE_SIZE {
        return Err(ValidationError::ImageTooLarge {
            size,
            max: MAX_IMAGE_SIZE,
        }
        .into());
    }

    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "image attached");
    Ok(encode_data_uri(mime, &bytes))
}
