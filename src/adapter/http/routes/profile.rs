use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapter::http::app_error_impl::ErrorResponse;
use crate::adapter::http::middleware::extractor::AuthUser;
use crate::adapter::http::schema::auth::MessageResponse;
use crate::adapter::http::schema::profile::{
    AddCustomSectionRequest, AddedCustomSectionResponse, DraftResponse, MoveSectionRequest, ProfileUpdateRequest,
    PublicProfileResponse, VisibilityRequest,
};
use crate::adapter::http::validation::ValidJson;
use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::profile::{
    AddCustomSectionDTO, EditDraftDTO, GetProfileDTO, MoveSectionDTO, RemoveSectionDTO, SetSectionVisibilityDTO,
};
use crate::application::interactors::profile::{
    AddCustomSectionInteractor, DiscardDraftInteractor, EditDraftInteractor, GetPublicProfileInteractor,
    MoveSectionInteractor, OpenDraftInteractor, RemoveSectionInteractor, SaveDraftInteractor,
    SetSectionVisibilityInteractor,
};
use crate::domain::entities::profile::{BuiltInSection, NewCustomSection};

#[utoipa::path(
    get,
    path = "/profiles/{handle}",
    tag = "Profiles",
    params(("handle" = String, Path, description = "Public handle of the profile")),
    responses(
        (
            status = 200,
            description = "Last saved version of the profile with its visible layout",
            body = PublicProfileResponse
        ),
        (
            status = 404,
            description = "No profile under this handle",
            body = ErrorResponse,
            example = json!({ "error": "Profile not found" })
        ),
        (
            status = 500,
            description = "Internal server error",
            body = ErrorResponse,
            example = json!({ "error": "Internal Server Error" })
        )
    ),
    security((), ("cookieAuth" = []))
)]
pub async fn get_public_profile(
    viewer: Option<AuthUser>,
    interactor: GetPublicProfileInteractor,
    Path(handle): Path<String>,
) -> AppResult<Json<PublicProfileResponse>> {
    let dto = GetProfileDTO {
        handle,
        viewer_id: viewer.map(|user| user.user_id),
    };
    let profile = interactor.execute(dto).await?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    get,
    path = "/profiles/{handle}/draft",
    tag = "Drafts",
    params(("handle" = String, Path, description = "Handle of the owned profile")),
    responses(
        (
            status = 200,
            description = "Working copy with its sync status",
            body = DraftResponse
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse,
            example = json!({ "error": "Invalid Credentials" })
        ),
        (
            status = 403,
            description = "Profile belongs to someone else",
            body = ErrorResponse,
            example = json!({ "error": "Access denied" })
        ),
        (
            status = 404,
            description = "No profile under this handle",
            body = ErrorResponse,
            example = json!({ "error": "Profile not found" })
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn open_draft(
    auth_user: AuthUser,
    interactor: OpenDraftInteractor,
    Path(handle): Path<String>,
) -> AppResult<Json<DraftResponse>> {
    let draft = interactor.execute(auth_user.draft_access(&handle)).await?;
    Ok(Json(draft.into()))
}

#[utoipa::path(
    patch,
    path = "/profiles/{handle}/draft",
    tag = "Drafts",
    params(("handle" = String, Path, description = "Handle of the owned profile")),
    request_body(
        content = ProfileUpdateRequest,
        example = json!(
            {
                "description": "Full-stack engineer",
                "imageUrl": null,
                "sectionOrder": ["socialLinks", "strengths"]
            }
        )
    ),
    responses(
        (
            status = 200,
            description = "Edit applied to the draft",
            body = DraftResponse
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse,
            example = json!({ "error": "Invalid Credentials" })
        ),
        (
            status = 403,
            description = "Profile belongs to someone else",
            body = ErrorResponse,
            example = json!({ "error": "Access denied" })
        ),
        (
            status = 422,
            description = "The merged profile is invalid",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Validation failed",
                    "fields": { "sectionOrder": ["section `strengths` appears more than once in the section order"] }
                }
            )
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn edit_draft(
    auth_user: AuthUser,
    interactor: EditDraftInteractor,
    Path(handle): Path<String>,
    ValidJson(payload): ValidJson<ProfileUpdateRequest>,
) -> AppResult<Json<DraftResponse>> {
    let dto = EditDraftDTO {
        access: auth_user.draft_access(&handle),
        update: payload.into(),
    };
    let draft = interactor.execute(dto).await?;
    Ok(Json(draft.into()))
}

#[utoipa::path(
    delete,
    path = "/profiles/{handle}/draft",
    tag = "Drafts",
    params(("handle" = String, Path, description = "Handle of the owned profile")),
    responses(
        (
            status = 200,
            description = "Unsaved edits dropped",
            body = MessageResponse,
            example = json!({ "message": "Draft discarded" })
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse,
            example = json!({ "error": "Invalid Credentials" })
        ),
        (
            status = 403,
            description = "Profile belongs to someone else",
            body = ErrorResponse,
            example = json!({ "error": "Access denied" })
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn discard_draft(
    auth_user: AuthUser,
    interactor: DiscardDraftInteractor,
    Path(handle): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    interactor.execute(auth_user.draft_access(&handle)).await?;
    Ok(Json(MessageResponse {
        message: "Draft discarded".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/profiles/{handle}/draft/save",
    tag = "Drafts",
    params(("handle" = String, Path, description = "Handle of the owned profile")),
    responses(
        (
            status = 200,
            description = "Draft persisted, or nothing to save",
            body = DraftResponse
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse,
            example = json!({ "error": "Invalid Credentials" })
        ),
        (
            status = 409,
            description = "Another save of this draft is running",
            body = ErrorResponse,
            example = json!({ "error": "A save is already in progress" })
        ),
        (
            status = 503,
            description = "Store unavailable, edits are kept in the draft",
            body = ErrorResponse,
            example = json!({ "error": "Failed to persist changes, unsaved edits are kept" })
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn save_draft(
    auth_user: AuthUser,
    interactor: SaveDraftInteractor,
    Path(handle): Path<String>,
) -> AppResult<Json<DraftResponse>> {
    let draft = interactor.execute(auth_user.draft_access(&handle)).await?;
    Ok(Json(draft.into()))
}

#[utoipa::path(
    post,
    path = "/profiles/{handle}/draft/sections",
    tag = "Drafts",
    params(("handle" = String, Path, description = "Handle of the owned profile")),
    request_body(
        content = AddCustomSectionRequest,
        example = json!({ "title": "Awards", "content": "", "type": "text" })
    ),
    responses(
        (
            status = 201,
            description = "Section appended to the draft",
            body = AddedCustomSectionResponse
        ),
        (
            status = 401,
            description = "Not authenticated",
            body = ErrorResponse,
            example = json!({ "error": "Invalid Credentials" })
        ),
        (
            status = 422,
            description = "Invalid section",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Validation failed",
                    "fields": { "title": ["Section title must be between 1 and 100 characters"] }
                }
            )
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn add_section(
    auth_user: AuthUser,
    interactor: AddCustomSectionInteractor,
    Path(handle): Path<String>,
    ValidJson(payload): ValidJson<AddCustomSectionRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = AddCustomSectionDTO {
        access: auth_user.draft_access(&handle),
        section: NewCustomSection {
            title: payload.title.trim().to_string(),
            content: payload.content,
            kind: payload.kind.into(),
        },
    };
    let added = interactor.execute(dto).await?;
    Ok((StatusCode::CREATED, Json(AddedCustomSectionResponse::from(added))))
}

#[utoipa::path(
    post,
    path = "/profiles/{handle}/draft/sections/{section_id}/move",
    tag = "Drafts",
    params(
        ("handle" = String, Path, description = "Handle of the owned profile"),
        ("section_id" = String, Path, description = "`strengths`, `socialLinks` or `custom_<id>`")
    ),
    request_body(content = MoveSectionRequest, example = json!({ "direction": "up" })),
    responses(
        (
            status = 200,
            description = "Section moved; unchanged at the edges",
            body = DraftResponse
        ),
        (
            status = 404,
            description = "Section is not part of the layout",
            body = ErrorResponse,
            example = json!({ "error": "Section not found: custom_42" })
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn move_section(
    auth_user: AuthUser,
    interactor: MoveSectionInteractor,
    Path((handle, section_id)): Path<(String, String)>,
    Json(payload): Json<MoveSectionRequest>,
) -> AppResult<Json<DraftResponse>> {
    let dto = MoveSectionDTO {
        access: auth_user.draft_access(&handle),
        section_id,
        direction: payload.direction.into(),
    };
    let draft = interactor.execute(dto).await?;
    Ok(Json(draft.into()))
}

#[utoipa::path(
    delete,
    path = "/profiles/{handle}/draft/sections/{section_id}",
    tag = "Drafts",
    params(
        ("handle" = String, Path, description = "Handle of the owned profile"),
        ("section_id" = String, Path, description = "`strengths`, `socialLinks` or `custom_<id>`")
    ),
    responses(
        (
            status = 200,
            description = "Section removed from the layout; built-in sections are hidden",
            body = DraftResponse
        ),
        (
            status = 404,
            description = "No such section",
            body = ErrorResponse,
            example = json!({ "error": "Section not found: custom_42" })
        ),
    ),
    security(("cookieAuth" = []))
)]
pub async fn remove_section(
    auth_user: AuthUser,
    interactor: RemoveSectionInteractor,
    Path((handle, section_id)): Path<(String, String)>,
) -> AppResult<Json<DraftResponse>> {
    let dto = RemoveSectionDTO {
        access: auth_user.draft_access(&handle),
        section_id,
    };
    let draft = interactor.execute(dto).await?;
    Ok(Json(draft.into()))
}

#[utoipa::path(
    put,
    path = "/profiles/{handle}/draft/sections/{section}/visibility",
    tag = "Drafts",
    params(
        ("handle" = String, Path, description = "Handle of the owned profile"),
        ("section" = String, Path, description = "`strengths` or `socialLinks`")
    ),
    request_body(content = VisibilityRequest, example = json!({ "visible": false })),
    responses(
        (
            status = 200,
            description = "Visibility flag updated",
            body = DraftResponse
        ),
        (
            status = 404,
            description = "Not a built-in section",
            body = ErrorResponse,
            example = json!({ "error": "Section not found: awards" })
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn set_visibility(
    auth_user: AuthUser,
    interactor: SetSectionVisibilityInteractor,
    Path((handle, section)): Path<(String, String)>,
    Json(payload): Json<VisibilityRequest>,
) -> AppResult<Json<DraftResponse>> {
    let built_in = BuiltInSection::from_identifier(&section).ok_or(AppError::SectionNotFound(section))?;
    let dto = SetSectionVisibilityDTO {
        access: auth_user.draft_access(&handle),
        section: built_in,
        visible: payload.visible,
    };
    let draft = interactor.execute(dto).await?;
    Ok(Json(draft.into()))
}
