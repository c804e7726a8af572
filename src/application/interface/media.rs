use crate::application::app_error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedMedia {
    pub kind: MediaKind,
    pub content_type: &'static str,
    pub ext: &'static str,
}

pub trait MediaInspector: Send + Sync {
    fn detect(&self, data: &[u8]) -> Option<DetectedMedia>;
    /// Decodes an image into a tightly packed RGBA8 buffer.
    fn decode_rgba(&self, data: &[u8]) -> AppResult<Vec<u8>>;
}
