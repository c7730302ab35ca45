use crate::error::{Result, StudioError};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// Decode raw image bytes (PNG or JPEG) into an RGB raster.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes).map_err(|e| {
        log::error!("Failed to decode image: {}", e);
        StudioError::Decode(e.to_string())
    })?;
    Ok(image.to_rgb8())
}

pub fn decode_base64_image(payload: &str) -> Result<RgbImage> {
    let bytes = STANDARD.decode(payload.trim()).map_err(|e| {
        log::error!("Failed to decode base64 payload: {}", e);
        StudioError::Decode(format!("invalid base64: {}", e))
    })?;
    decode_image(&bytes)
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| StudioError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

pub fn encode_png_base64(image: &RgbImage) -> Result<String> {
    Ok(STANDARD.encode(encode_png(image)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample() -> RgbImage {
        RgbImage::from_fn(6, 4, |x, y| Rgb([x as u8 * 40, y as u8 * 60, 200]))
    }

    #[test]
    fn test_png_base64_preserves_pixels() {
        let original = sample();
        let decoded = decode_base64_image(&encode_png_base64(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_rgba_is_normalized_to_rgb() {
        let rgba = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 128]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(bytes.get_ref()).unwrap();
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            decode_base64_image("not base64 at all!!"),
            Err(StudioError::Decode(_))
        ));
        let not_an_image = STANDARD.encode(b"plain text, no pixels here");
        assert!(matches!(
            decode_base64_image(&not_an_image),
            Err(StudioError::Decode(_))
        ));
    }
}
