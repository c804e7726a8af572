use axum::{Json, response::Html};
use utoipa::{
    Modify, OpenApi,
    openapi::{
        OpenApi as OpenApiDoc,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};

use crate::adapter::http::{
    app_error_impl::ErrorResponse,
    routes::{auth, media, profile},
    schema::{
        ValidPassword,
        auth::{IdentityResponse, MessageResponse, SignInRequest, SignUpRequest},
        media::{DeleteMediaRequest, ProfileImageResponse, SectionMediaResponse, UploadForm},
        profile::{
            AddCustomSectionRequest, AddedCustomSectionResponse, ColorSchema, CustomSectionSchema, DraftResponse,
            MoveDirectionSchema, MoveSectionRequest, ProfileSchema, ProfileUpdateRequest, PublicProfileResponse,
            SectionKindSchema, SocialLinkSchema, StrengthSchema, SyncStatusSchema, ThemeSchema, VisibilityFlagsSchema,
            VisibilityRequest,
        },
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut OpenApiDoc) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookieAuth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session_id"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        auth::signup,
        auth::signin,
        auth::signout,
        auth::current_session,
        profile::get_public_profile,
        profile::open_draft,
        profile::edit_draft,
        profile::discard_draft,
        profile::save_draft,
        profile::add_section,
        profile::move_section,
        profile::remove_section,
        profile::set_visibility,
        media::upload_profile_image,
        media::upload_section_media,
        media::delete_section_media
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            ValidPassword,
            SignUpRequest,
            SignInRequest,
            IdentityResponse,
            StrengthSchema,
            SocialLinkSchema,
            SectionKindSchema,
            CustomSectionSchema,
            VisibilityFlagsSchema,
            ColorSchema,
            ThemeSchema,
            ProfileSchema,
            SyncStatusSchema,
            DraftResponse,
            PublicProfileResponse,
            AddedCustomSectionResponse,
            ProfileUpdateRequest,
            AddCustomSectionRequest,
            MoveDirectionSchema,
            MoveSectionRequest,
            VisibilityRequest,
            UploadForm,
            ProfileImageResponse,
            SectionMediaResponse,
            DeleteMediaRequest
        )
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<OpenApiDoc> {
    Json(ApiDoc::openapi())
}

pub async fn docs_ui() -> Html<&'static str> {
    Html(
        r#"
            <!doctype html>
            <html>
              <head>
                <title>Promotion page API</title>
                <meta charset="utf-8">
                <meta name="viewport" content="width=device-width, initial-scale=1">
                <script src="https://unpkg.com/@stoplight/elements/web-components.min.js"></script>
                <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements/styles.min.css">
              </head>
              <body style="height: 100%; margin: 0;">
                <elements-api
                  apiDescriptionUrl="openapi.json"
                  basePath="/"
                  router="hash"
                />
              </body>
            </html>
        "#,
    )
}
