use bytes::Bytes;

use crate::application::dto::profile::{DraftAccessDTO, DraftDTO};
use crate::domain::entities::color::Color;

#[derive(Debug, Clone)]
pub struct UploadProfileImageDTO {
    pub access: DraftAccessDTO,
    pub data: Bytes,
    pub max_bytes: usize,
    pub palette_stride: usize,
}

#[derive(Debug, Clone)]
pub struct ProfileImageDTO {
    pub image_url: String,
    pub palette: Vec<Color>,
    pub draft: DraftDTO,
}

#[derive(Debug, Clone)]
pub struct UploadSectionMediaDTO {
    pub access: DraftAccessDTO,
    pub section_id: String,
    pub data: Bytes,
    pub max_image_bytes: usize,
    pub max_video_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SectionMediaDTO {
    pub url: String,
    pub draft: DraftDTO,
}

#[derive(Debug, Clone)]
pub struct DeleteSectionMediaDTO {
    pub access: DraftAccessDTO,
    pub section_id: String,
    pub url: String,
}
