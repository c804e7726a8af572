use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::adapter::http::schema::profile::{ColorSchema, DraftResponse};
use crate::application::dto::media::{ProfileImageDTO, SectionMediaDTO};

/// Multipart body of the upload endpoints; only documents the `file` part.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageResponse {
    pub image_url: String,
    /// Dominant colors of the picture, most frequent first.
    pub palette: Vec<ColorSchema>,
    pub draft: DraftResponse,
}

impl From<ProfileImageDTO> for ProfileImageResponse {
    fn from(dto: ProfileImageDTO) -> Self {
        Self {
            image_url: dto.image_url,
            palette: dto.palette.into_iter().map(Into::into).collect(),
            draft: dto.draft.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SectionMediaResponse {
    pub url: String,
    pub draft: DraftResponse,
}

impl From<SectionMediaDTO> for SectionMediaResponse {
    fn from(dto: SectionMediaDTO) -> Self {
        Self {
            url: dto.url,
            draft: dto.draft.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteMediaRequest {
    pub url: String,
}
