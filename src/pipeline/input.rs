//! Input resolution: load a report image from a local path or a URL.
//!
//! The image is read fully into memory; report photos are a few MB at most.
//! The format is taken from the magic bytes rather than the file extension,
//! because phone galleries and messaging apps routinely rename files.

use crate::error::Report2MsgError;
use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use tracing::{debug, info};

/// A decoded report image and where it came from.
pub struct LoadedImage {
    /// File path or URL as given by the caller.
    pub source: String,
    /// Detected encoding (JPEG or PNG).
    pub format: ImageFormat,
    /// Decoded pixels.
    pub image: DynamicImage,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load and decode the report image named by `input`.
///
/// If the input is a URL, download it; otherwise read the local file.
pub async fn load_image(input: &str, timeout_secs: u64) -> Result<LoadedImage, Report2MsgError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Report2MsgError::InvalidInput {
            input: input.to_string(),
        });
    }

    let bytes = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };

    decode_image(input, &bytes)
}

/// Decode an in-memory JPEG or PNG.
///
/// `source_name` is only used in error messages and [`LoadedImage::source`].
pub fn decode_image(source_name: &str, bytes: &[u8]) -> Result<LoadedImage, Report2MsgError> {
    let format = detect_format(source_name, bytes)?;
    let image = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        Report2MsgError::ImageDecodeFailed {
            source_name: source_name.to_string(),
            detail: e.to_string(),
        }
    })?;

    debug!(
        "Decoded {:?} image {}x{} from {}",
        format,
        image.width(),
        image.height(),
        source_name
    );

    Ok(LoadedImage {
        source: source_name.to_string(),
        format,
        image,
    })
}

/// Accept only JPEG and PNG, judged by content.
fn detect_format(source_name: &str, bytes: &[u8]) -> Result<ImageFormat, Report2MsgError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok(ImageFormat::Jpeg),
        Ok(ImageFormat::Png) => Ok(ImageFormat::Png),
        Ok(other) => Err(Report2MsgError::UnsupportedImage {
            source_name: source_name.to_string(),
            detail: format!("format {:?}", other),
        }),
        Err(_) => Err(Report2MsgError::UnsupportedImage {
            source_name: source_name.to_string(),
            detail: "unrecognised file contents".to_string(),
        }),
    }
}

async fn read_local(path_str: &str) -> Result<Vec<u8>, Report2MsgError> {
    let path = PathBuf::from(path_str);

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Report2MsgError::PermissionDenied { path })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Report2MsgError::ImageNotFound { path })
        }
        Err(e) => Err(Report2MsgError::Internal(format!(
            "Failed to read '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, Report2MsgError> {
    info!("Downloading report image from: {}", url);

    if reqwest::Url::parse(url).is_err() {
        return Err(Report2MsgError::InvalidInput {
            input: url.to_string(),
        });
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Report2MsgError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Report2MsgError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Report2MsgError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Report2MsgError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Report2MsgError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}
