use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ImageFormat};

use crate::{
    error::{ImageGenError, Result},
    types::Payload,
};

/// A decoded image plus the bytes offered for download
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub raw_bytes: Vec<u8>,
}

/// Decode a vendor payload
///
/// Base64 payloads keep the decoded file bytes verbatim for download and
/// normalize the bitmap to RGBA. Byte payloads keep the native bitmap and
/// are re-encoded as PNG for download.
///
/// # Errors
///
/// Returns [`ImageGenError::DecodeFailure`] for invalid base64 or data that
/// is not a supported image format
pub fn decode(payload: Payload) -> Result<DecodedImage> {
    match payload {
        Payload::Base64(encoded) => decode_base64(&encoded),
        Payload::Bytes(bytes) => decode_bytes(&bytes),
    }
}

fn decode_base64(encoded: &str) -> Result<DecodedImage> {
    let raw_bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| ImageGenError::DecodeFailure(format!("invalid base64 payload: {e}")))?;

    let image = image::load_from_memory(&raw_bytes)
        .map_err(|e| ImageGenError::DecodeFailure(e.to_string()))?;

    Ok(DecodedImage {
        image: DynamicImage::ImageRgba8(image.to_rgba8()),
        raw_bytes,
    })
}

fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let image = image::load_from_memory(bytes).map_err(|e| ImageGenError::DecodeFailure(e.to_string()))?;

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ImageGenError::DecodeFailure(format!("failed to encode PNG: {e}")))?;

    Ok(DecodedImage { image, raw_bytes: png })
}
