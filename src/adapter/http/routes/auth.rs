use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::adapter::http::app_error_impl::ErrorResponse;
use crate::adapter::http::middleware::auth::{build_logout_cookie, build_session_cookie};
use crate::adapter::http::middleware::extractor::AuthUser;
use crate::adapter::http::schema::auth::{IdentityResponse, MessageResponse, SignInRequest, SignUpRequest};
use crate::adapter::http::validation::ValidJson;
use crate::application::app_error::AppResult;
use crate::application::dto::auth::{SignInDTO, SignOutDTO, SignUpDTO, SignedInDTO};
use crate::application::interactors::auth::{
    GetCurrentIdentityInteractor, SignInInteractor, SignOutInteractor, SignUpInteractor,
};
use crate::infra::config::AppConfig;

fn signed_in_response(
    status: StatusCode,
    signed_in: SignedInDTO,
    config: &AppConfig,
) -> AppResult<(StatusCode, HeaderMap, Json<IdentityResponse>)> {
    let cookie = build_session_cookie(&signed_in.session_id, signed_in.remember_me, &config.session);
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, HeaderValue::from_str(&cookie)?);
    Ok((status, headers, Json(IdentityResponse::from(signed_in.identity))))
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body(
        content = SignUpRequest,
        example = json!(
            {
                "email": "jane@example.com",
                "password": "Password123!",
                "displayName": "Jane Doe",
                "handle": "jane-doe",
                "rememberMe": false
            }
        )
    ),
    responses(
        (
            status = 201,
            description = "Account and profile created, session started",
            body = IdentityResponse,
            example = json!(
                {
                    "id": "019c47ec-183d-744e-b11d-cd409015bf13",
                    "email": "jane@example.com",
                    "displayName": "Jane Doe",
                    "handle": "jane-doe"
                }
            )
        ),
        (
            status = 409,
            description = "Email or handle already in use",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Handle is already taken",
                    "fields": { "handle": ["Handle is already taken"] }
                }
            )
        ),
        (
            status = 422,
            description = "Invalid sign-up data",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Validation failed",
                    "fields": { "handle": ["Handle must be between 3 and 20 characters"] }
                }
            )
        ),
        (
            status = 500,
            description = "Internal server error",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Internal Server Error"
                }
            )
        )
    )
)]
pub async fn signup(
    interactor: SignUpInteractor,
    State(config): State<Arc<AppConfig>>,
    ValidJson(payload): ValidJson<SignUpRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = SignUpDTO {
        email: payload.email.to_string(),
        password: payload.password.value().to_string(),
        display_name: payload.display_name.trim().to_string(),
        handle: payload.handle,
        remember_me: payload.remember_me,
    };
    let signed_in = interactor.execute(dto).await?;
    signed_in_response(StatusCode::CREATED, signed_in, &config)
}

#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "Auth",
    request_body(
        content = SignInRequest,
        example = json!(
            {
                "email": "jane@example.com",
                "password": "Password123!",
                "rememberMe": true
            }
        )
    ),
    responses(
        (
            status = 200,
            description = "Signed in",
            body = IdentityResponse,
            example = json!(
                {
                    "id": "019c47ec-183d-744e-b11d-cd409015bf13",
                    "email": "jane@example.com",
                    "displayName": "Jane Doe",
                    "handle": "jane-doe"
                }
            )
        ),
        (
            status = 401,
            description = "Wrong email or password",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Invalid Credentials"
                }
            )
        ),
        (
            status = 500,
            description = "Internal server error",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Internal Server Error"
                }
            )
        )
    )
)]
pub async fn signin(
    interactor: SignInInteractor,
    State(config): State<Arc<AppConfig>>,
    Json(payload): Json<SignInRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = SignInDTO {
        email: payload.email.to_string(),
        password: payload.password,
        remember_me: payload.remember_me,
    };
    let signed_in = interactor.execute(dto).await?;
    signed_in_response(StatusCode::OK, signed_in, &config)
}

#[utoipa::path(
    post,
    path = "/auth/signout",
    tag = "Auth",
    responses(
        (
            status = 200,
            description = "Signed out, unsaved draft discarded",
            body = MessageResponse,
            example = json!(
                {
                    "message": "Signed out successfully"
                }
            )
        ),
        (
            status = 401,
            description = "Missing or invalid session",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Invalid Credentials"
                }
            )
        ),
        (
            status = 500,
            description = "Internal server error",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Internal Server Error"
                }
            )
        )
    ),
    security(("cookieAuth" = []))
)]
pub async fn signout(
    auth_user: AuthUser,
    interactor: SignOutInteractor,
    State(config): State<Arc<AppConfig>>,
) -> AppResult<impl IntoResponse> {
    let cookie = build_logout_cookie(&config.session);
    interactor
        .execute(SignOutDTO {
            user_id: auth_user.user_id,
            handle: auth_user.handle,
        })
        .await?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, HeaderValue::from_str(&cookie)?);
    Ok((
        StatusCode::OK,
        headers,
        Json(MessageResponse {
            message: "Signed out successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "Auth",
    responses(
        (
            status = 200,
            description = "Current identity, or null when signed out",
            body = IdentityResponse,
            example = json!(
                {
                    "id": "019c47ec-183d-744e-b11d-cd409015bf13",
                    "email": "jane@example.com",
                    "displayName": "Jane Doe",
                    "handle": "jane-doe"
                }
            )
        ),
        (
            status = 500,
            description = "Internal server error",
            body = ErrorResponse,
            example = json!(
                {
                    "error": "Internal Server Error"
                }
            )
        )
    ),
    security((), ("cookieAuth" = []))
)]
pub async fn current_session(
    auth_user: Option<AuthUser>,
    interactor: GetCurrentIdentityInteractor,
) -> AppResult<Json<Option<IdentityResponse>>> {
    let Some(auth_user) = auth_user else {
        return Ok(Json(None));
    };
    let identity = interactor.execute(auth_user.user_id).await?;
    Ok(Json(identity.map(IdentityResponse::from)))
}
