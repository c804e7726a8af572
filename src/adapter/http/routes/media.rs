use axum::Json;
use axum::extract::{Multipart, Path, State};
use bytes::Bytes;

use crate::adapter::http::app_error_impl::ErrorResponse;
use crate::adapter::http::middleware::extractor::AuthUser;
use crate::adapter::http::schema::media::{DeleteMediaRequest, ProfileImageResponse, SectionMediaResponse, UploadForm};
use crate::adapter::http::schema::profile::DraftResponse;
use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::media::{DeleteSectionMediaDTO, UploadProfileImageDTO, UploadSectionMediaDTO};
use crate::application::interactors::media::{
    DeleteSectionMediaInteractor, UploadProfileImageInteractor, UploadSectionMediaInteractor,
};
use crate::infra::config::MediaConfig;

const FILE_FIELD: &str = "file";

/// Reads the `file` part; other parts are skipped.
async fn read_file(mut multipart: Multipart) -> AppResult<Bytes> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                return Err(AppError::invalid_field(FILE_FIELD, "File is empty"));
            }
            return Ok(bytes);
        }
    }
    Err(AppError::invalid_field(FILE_FIELD, "File is required"))
}

#[utoipa::path(
    post,
    path = "/profiles/{handle}/draft/image",
    tag = "Media",
    params(("handle" = String, Path, description = "Handle of the owned profile")),
    request_body(
        content_type = "multipart/form-data",
        content = UploadForm,
        description = "PNG, JPEG, GIF or WebP picture"
    ),
    responses(
        (
            status = 200,
            description = "Picture stored and applied to the draft, with a suggested palette",
            body = ProfileImageResponse
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse,
            example = json!({ "error": "Invalid Credentials" })
        ),
        (
            status = 413,
            description = "Picture exceeds the size limit",
            body = ErrorResponse,
            example = json!({ "error": "Payload exceeds the limit of 5242880 bytes" })
        ),
        (
            status = 415,
            description = "Not a supported image format",
            body = ErrorResponse,
            example = json!({ "error": "Unsupported media type" })
        ),
        (
            status = 422,
            description = "Picture could not be decoded",
            body = ErrorResponse,
            example = json!({ "error": "Validation failed", "fields": { "file": ["File is not a readable image"] } })
        ),
        (
            status = 502,
            description = "Media storage rejected the upload",
            body = ErrorResponse,
            example = json!({ "error": "Upload to media storage failed" })
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn upload_profile_image(
    auth_user: AuthUser,
    interactor: UploadProfileImageInteractor,
    State(media): State<MediaConfig>,
    Path(handle): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ProfileImageResponse>> {
    let data = read_file(multipart).await?;
    let dto = UploadProfileImageDTO {
        access: auth_user.draft_access(&handle),
        data,
        max_bytes: media.max_image_bytes,
        palette_stride: media.palette_stride,
    };
    let uploaded = interactor.execute(dto).await?;
    Ok(Json(uploaded.into()))
}

#[utoipa::path(
    post,
    path = "/profiles/{handle}/draft/sections/{section_id}/media",
    tag = "Media",
    params(
        ("handle" = String, Path, description = "Handle of the owned profile"),
        ("section_id" = String, Path, description = "`custom_<id>` of an image or video section")
    ),
    request_body(
        content_type = "multipart/form-data",
        content = UploadForm,
        description = "Image for image sections, MP4, WebM or QuickTime video for video sections"
    ),
    responses(
        (
            status = 200,
            description = "Media stored and appended to the section",
            body = SectionMediaResponse
        ),
        (
            status = 404,
            description = "No such custom section",
            body = ErrorResponse,
            example = json!({ "error": "Section not found: custom_42" })
        ),
        (
            status = 413,
            description = "File exceeds the size limit",
            body = ErrorResponse,
            example = json!({ "error": "Payload exceeds the limit of 52428800 bytes" })
        ),
        (
            status = 415,
            description = "File type does not match the section type",
            body = ErrorResponse,
            example = json!({ "error": "Unsupported media type" })
        ),
        (
            status = 502,
            description = "Media storage rejected the upload",
            body = ErrorResponse,
            example = json!({ "error": "Upload to media storage failed" })
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn upload_section_media(
    auth_user: AuthUser,
    interactor: UploadSectionMediaInteractor,
    State(media): State<MediaConfig>,
    Path((handle, section_id)): Path<(String, String)>,
    multipart: Multipart,
) -> AppResult<Json<SectionMediaResponse>> {
    let data = read_file(multipart).await?;
    let dto = UploadSectionMediaDTO {
        access: auth_user.draft_access(&handle),
        section_id,
        data,
        max_image_bytes: media.max_image_bytes,
        max_video_bytes: media.max_video_bytes,
    };
    let uploaded = interactor.execute(dto).await?;
    Ok(Json(uploaded.into()))
}

#[utoipa::path(
    delete,
    path = "/profiles/{handle}/draft/sections/{section_id}/media",
    tag = "Media",
    params(
        ("handle" = String, Path, description = "Handle of the owned profile"),
        ("section_id" = String, Path, description = "`custom_<id>` of the section")
    ),
    request_body(
        content = DeleteMediaRequest,
        example = json!({ "url": "http://127.0.0.1:9000/promo-media/custom-sections/jdoe/custom_1/images/1700000000000-0190a6b2c3d47e8f9a0b1c2d3e4f5a6b.png" })
    ),
    responses(
        (
            status = 200,
            description = "URL removed from the draft section; media uploaded into the section is deleted after the next save",
            body = DraftResponse
        ),
        (
            status = 404,
            description = "No such custom section",
            body = ErrorResponse,
            example = json!({ "error": "Section not found: custom_42" })
        ),
        (
            status = 422,
            description = "URL is not attached to the section",
            body = ErrorResponse,
            example = json!({ "error": "Validation failed", "fields": { "url": ["not attached to this section"] } })
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn delete_section_media(
    auth_user: AuthUser,
    interactor: DeleteSectionMediaInteractor,
    Path((handle, section_id)): Path<(String, String)>,
    Json(payload): Json<DeleteMediaRequest>,
) -> AppResult<Json<DraftResponse>> {
    let dto = DeleteSectionMediaDTO {
        access: auth_user.draft_access(&handle),
        section_id,
        url: payload.url,
    };
    let draft = interactor.execute(dto).await?;
    Ok(Json(draft.into()))
}
