//! Image encoding: `DynamicImage` → base64 `ImageData` for the vision API.
//!
//! Vision APIs take images as base64 data embedded in the JSON request body.
//! The image keeps the encoding it arrived in: a PNG scan stays lossless, a
//! JPEG phone photo is re-encoded as JPEG at high quality rather than
//! ballooning into a multi-megabyte PNG.
//!
//! Before encoding, images whose longest edge exceeds
//! [`crate::config::ReportConfig::max_image_pixels`] are downscaled with the
//! aspect ratio preserved.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// JPEG quality used when re-encoding photos. Text stays legible at 90.
const JPEG_QUALITY: u8 = 90;

/// Downscale (if needed) and encode a report image for the vision API.
///
/// `detail: "high"` asks OpenAI-style models for full tiling; small
/// handwriting on a report is lost at the single-tile "low" setting.
/// Providers that do not know the field ignore it.
pub fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    max_pixels: u32,
) -> Result<ImageData, image::ImageError> {
    let img = fit_within(img, max_pixels);

    let mut buf = Vec::new();
    let mime = match format {
        ImageFormat::Jpeg => {
            let rgb = img.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            rgb.write_with_encoder(encoder)?;
            "image/jpeg"
        }
        _ => {
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
            "image/png"
        }
    };

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded {} image → {} bytes base64", mime, b64.len());

    Ok(ImageData::new(b64, mime).with_detail("high"))
}

/// Shrink `img` so neither edge exceeds `max_pixels`.
fn fit_within(img: &DynamicImage, max_pixels: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if w <= max_pixels && h <= max_pixels {
        return img.clone();
    }
    debug!("Downscaling {}x{} to fit {} px", w, h, max_pixels);
    img.resize(max_pixels, max_pixels, FilterType::Lanczos3)
}
