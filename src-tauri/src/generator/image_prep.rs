//! Upload loading, resizing, and base64 encoding for the generation API.
//!
//! All uploads are resized to max 1024px on the longest edge to control
//! API payload size.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use tracing::info;

use crate::error::TryOnError;
use crate::session::types::ImageAsset;

/// Maximum dimension (width or height) for images sent to the API.
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

/// Minimum dimension for a usable input (too small = unusable synthesis).
pub const MIN_IMAGE_DIMENSION: u32 = 200;

/// Prepare an uploaded image for the generation API: load, validate,
/// resize, re-encode.
///
/// # Arguments
/// * `image_bytes` - Raw image bytes (JPEG, PNG, WebP, etc.)
///
/// # Returns
/// An [`ImageAsset`] holding a base64-encoded JPEG ready for the API payload.
///
/// # Errors
/// - Image cannot be decoded
/// - Image too small (< 200px on shortest side)
pub fn prepare_upload(image_bytes: &[u8]) -> Result<ImageAsset, TryOnError> {
    let img = image::load_from_memory(image_bytes).map_err(|e| {
        TryOnError::Image(format!(
            "Failed to load image: {}. Ensure it's a valid JPEG/PNG/WebP.",
            e
        ))
    })?;

    let (width, height) = (img.width(), img.height());
    info!("Loaded upload: {}x{}", width, height);

    let min_side = width.min(height);
    if min_side < MIN_IMAGE_DIMENSION {
        return Err(TryOnError::Image(format!(
            "Image too small for try-on: {}x{}. Minimum dimension is {}px.",
            width, height, MIN_IMAGE_DIMENSION
        )));
    }

    let resized = resize_if_needed(img, MAX_IMAGE_DIMENSION);
    info!("Resized to: {}x{}", resized.width(), resized.height());

    let jpeg_bytes = encode_to_jpeg(&resized)?;
    info!("Encoded to JPEG: {} bytes", jpeg_bytes.len());

    Ok(ImageAsset {
        data_base64: STANDARD.encode(&jpeg_bytes),
        media_type: "image/jpeg".to_string(),
    })
}

/// Resize image if either dimension exceeds max, maintaining aspect ratio.
fn resize_if_needed(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());

    if width <= max_dimension && height <= max_dimension {
        return img;
    }

    let scale = max_dimension as f32 / width.max(height) as f32;
    let new_width = (width as f32 * scale) as u32;
    let new_height = (height as f32 * scale) as u32;

    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

/// Encode DynamicImage to JPEG bytes.
fn encode_to_jpeg(img: &DynamicImage) -> Result<Vec<u8>, TryOnError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| TryOnError::Image(format!("Failed to encode image to JPEG: {}", e)))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_prepare_upload_rejects_too_small() {
        let result = prepare_upload(&png_bytes(50, 50));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too small"));
    }

    #[test]
    fn test_prepare_upload_rejects_invalid() {
        let result = prepare_upload(b"not an image");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to load"));
    }

    #[test]
    fn test_resize_if_needed_no_resize() {
        let img = DynamicImage::new_rgb8(500, 300);
        let resized = resize_if_needed(img, 1024);
        assert_eq!(resized.width(), 500);
        assert_eq!(resized.height(), 300);
    }

    #[test]
    fn test_resize_if_needed_resize_width() {
        let img = DynamicImage::new_rgb8(2000, 1000);
        let resized = resize_if_needed(img, 1024);
        assert_eq!(resized.width(), 1024);
        assert_eq!(resized.height(), 512);
    }

    #[test]
    fn test_resize_if_needed_resize_height() {
        let img = DynamicImage::new_rgb8(1000, 2000);
        let resized = resize_if_needed(img, 1024);
        assert_eq!(resized.width(), 512);
        assert_eq!(resized.height(), 1024);
    }

    #[test]
    fn test_prepare_upload_valid_image() {
        let result = prepare_upload(&png_bytes(300, 300));
        assert!(result.is_ok());

        let asset = result.unwrap();
        assert_eq!(asset.media_type, "image/jpeg");

        // Decoded payload is a JPEG
        let jpeg_bytes = STANDARD.decode(&asset.data_base64).unwrap();
        assert_eq!(jpeg_bytes[0], 0xFF);
        assert_eq!(jpeg_bytes[1], 0xD8);
    }

    #[test]
    fn test_prepare_upload_resizes_oversized() {
        let result = prepare_upload(&png_bytes(2048, 1024));
        assert!(result.is_ok());

        let jpeg_bytes = STANDARD.decode(&result.unwrap().data_base64).unwrap();
        let reloaded = image::load_from_memory(&jpeg_bytes).unwrap();
        assert_eq!(reloaded.width(), 1024);
        assert_eq!(reloaded.height(), 512);
    }
}
