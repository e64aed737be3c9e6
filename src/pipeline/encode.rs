//! Slice encoding: `DynamicImage` → base64 JPEG.
//!
//! JPEG at quality 85 is a deliberate trade-off: the slices are photographic
//! renders of full design pages, and a lossy encode at this quality keeps
//! each payload small enough for the model's prompt-size limits while
//! preserving readable UI text. Rendered pages arrive as RGBA from pdfium;
//! JPEG has no alpha channel, so the image is flattened to RGB first.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered slice as base64 JPEG at the given quality.
pub fn encode_slice(img: &DynamicImage, quality: u8) -> Result<String, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    rgb.write_with_encoder(encoder)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} slice → {} bytes base64",
        img.width(),
        img.height(),
        b64.len()
    );

    Ok(b64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_slice() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let b64 = encode_slice(&img, 85).expect("encode should succeed");
        assert!(!b64.is_empty());

        // Valid base64 and a JPEG header underneath.
        let decoded = STANDARD.decode(&b64).expect("valid base64");
        assert_eq!(&decoded[..2], &[0xFF, 0xD8], "expected JPEG SOI marker");
    }

    #[test]
    fn alpha_is_flattened_before_encode() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 128, 255, 128])));
        assert!(encode_slice(&img, 85).is_ok());
    }
}
