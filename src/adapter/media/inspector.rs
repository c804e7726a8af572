use image::ImageFormat;

use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::media::{DetectedMedia, MediaInspector, MediaKind};

const fn image(content_type: &'static str, ext: &'static str) -> DetectedMedia {
    DetectedMedia {
        kind: MediaKind::Image,
        content_type,
        ext,
    }
}

const fn video(content_type: &'static str, ext: &'static str) -> DetectedMedia {
    DetectedMedia {
        kind: MediaKind::Video,
        content_type,
        ext,
    }
}

const PNG: DetectedMedia = image("image/png", "png");
const JPEG: DetectedMedia = image("image/jpeg", "jpg");
const GIF: DetectedMedia = image("image/gif", "gif");
const WEBP: DetectedMedia = image("image/webp", "webp");
const MP4: DetectedMedia = video("video/mp4", "mp4");
const QUICKTIME: DetectedMedia = video("video/quicktime", "mov");
const WEBM: DetectedMedia = video("video/webm", "webm");

/// Sniffs uploads by their leading bytes and decodes images with the `image` crate.
#[derive(Default, Clone)]
pub struct ImageMediaInspector;

impl ImageMediaInspector {
    fn detect_video(data: &[u8]) -> Option<DetectedMedia> {
        if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            return Some(WEBM);
        }
        // ISO base media: box size, then `ftyp` and the major brand.
        if data.len() >= 12 && &data[4..8] == b"ftyp" {
            return match &data[8..12] {
                b"qt  " => Some(QUICKTIME),
                _ => Some(MP4),
            };
        }
        None
    }
}

impl MediaInspector for ImageMediaInspector {
    fn detect(&self, data: &[u8]) -> Option<DetectedMedia> {
        match image::guess_format(data) {
            Ok(ImageFormat::Png) => Some(PNG),
            Ok(ImageFormat::Jpeg) => Some(JPEG),
            Ok(ImageFormat::Gif) => Some(GIF),
            Ok(ImageFormat::WebP) => Some(WEBP),
            Ok(_) => None,
            Err(_) => Self::detect_video(data),
        }
    }

    fn decode_rgba(&self, data: &[u8]) -> AppResult<Vec<u8>> {
        let decoded = image::load_from_memory(data).map_err(|e| AppError::ImageDecodeError(e.to_string()))?;
        Ok(decoded.to_rgba8().into_raw())
    }
}
