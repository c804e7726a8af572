use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::adapter::http::middleware::extractor::AuthUser;
use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::session::{SessionDTO, SessionValidationResult};
use crate::application::interactors::session::ValidateSessionInteractor;
use crate::infra::config::{AppConfig, SessionConfig};

/// Rejects the request with 401 unless it carries a live session cookie.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    interactor: ValidateSessionInteractor,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let session_id = extract_session_id(&request, &config.session.cookie_name).ok_or(AppError::InvalidCredentials)?;
    let auth_user = resolve(&interactor, &config.session, session_id)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Attaches the caller's identity when a live session cookie is present and lets anonymous
/// requests through.
pub async fn identify_middleware(
    State(config): State<Arc<AppConfig>>,
    interactor: ValidateSessionInteractor,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    if let Some(session_id) = extract_session_id(&request, &config.session.cookie_name) {
        if let Some(auth_user) = resolve(&interactor, &config.session, session_id).await? {
            request.extensions_mut().insert(auth_user);
        }
    }
    Ok(next.run(request).await)
}

async fn resolve(
    interactor: &ValidateSessionInteractor,
    config: &SessionConfig,
    session_id: String,
) -> AppResult<Option<AuthUser>> {
    let dto = SessionDTO {
        id: session_id,
        default_max_lifetime: config.default_max_lifetime,
        default_idle_timeout: config.default_idle_timeout,
        remembered_max_lifetime: config.remembered_max_lifetime,
        remembered_idle_timeout: config.remembered_idle_timeout,
    };
    match interactor.execute(dto).await? {
        SessionValidationResult::Valid(identity) => Ok(Some(AuthUser {
            user_id: identity.user_id,
            handle: identity.handle,
        })),
        SessionValidationResult::Expired => {
            debug!("Expired session cookie presented");
            Ok(None)
        }
        SessionValidationResult::Invalid => Ok(None),
    }
}

fn extract_session_id(request: &Request, cookie_name: &str) -> Option<String> {
    let cookie_header = request.headers().get(COOKIE)?.to_str().ok()?;
    let prefix = format!("{}=", cookie_name);
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn build_session_cookie(session_id: &str, remember_me: bool, config: &SessionConfig) -> String {
    let max_age = if remember_me {
        config.remembered_max_lifetime
    } else {
        config.default_max_lifetime
    };

    let secure = if config.cookie_secure { "; Secure" } else { "" };
    let http_only = if config.cookie_http_only { "; HttpOnly" } else { "" };
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax{}{}",
        config.cookie_name, session_id, max_age, secure, http_only
    )
}

pub fn build_logout_cookie(config: &SessionConfig) -> String {
    format!("{}=; Path=/; Max-Age=0; SameSite=Lax", config.cookie_name)
}
