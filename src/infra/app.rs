use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{self};
use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

use crate::adapter::http::docs::{docs_ui, openapi_json};
use crate::adapter::http::middleware::auth::{auth_middleware, identify_middleware};
use crate::adapter::http::routes::auth::{current_session, signin, signout, signup};
use crate::adapter::http::routes::media::{delete_section_media, upload_profile_image, upload_section_media};
use crate::adapter::http::routes::profile::{
    add_section, discard_draft, edit_draft, get_public_profile, move_section, open_draft, remove_section, save_draft,
    set_visibility,
};
use crate::infra::config::AppConfig;
use crate::infra::state::AppState;

/// Room for the multipart framing around the largest accepted file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const METHODS: [http::Method; 5] = [
    http::Method::POST,
    http::Method::GET,
    http::Method::PATCH,
    http::Method::PUT,
    http::Method::DELETE,
];

fn build_cors(config: &AppConfig) -> CorsLayer {
    let has_wildcard = config.application.allow_origins.iter().any(|s| s == "*");

    if has_wildcard {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(METHODS)
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
    }
    let origins: Vec<http::HeaderValue> = config
        .application
        .allow_origins
        .iter()
        .filter_map(|s| {
            s.parse::<http::HeaderValue>()
                .map_err(|e| {
                    tracing::warn!("Failed to parse origin '{}': {}", s, e);
                })
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

pub fn auth_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin));

    let identified_routes = Router::new()
        .route("/session", get(current_session))
        .route_layer(middleware::from_fn_with_state(state.clone(), identify_middleware));

    let protected_routes = Router::new()
        .route("/signout", post(signout))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(identified_routes)
        .merge(protected_routes)
}

pub fn draft_router(state: AppState) -> Router<AppState> {
    let upload_limit = state.config.media.max_image_bytes.max(state.config.media.max_video_bytes) + MULTIPART_OVERHEAD;

    let media_routes = Router::new()
        .route("/image", post(upload_profile_image))
        .route(
            "/sections/{section_id}/media",
            post(upload_section_media).delete(delete_section_media),
        )
        .layer(DefaultBodyLimit::max(upload_limit));

    Router::new()
        .route("/", get(open_draft).patch(edit_draft).delete(discard_draft))
        .route("/save", post(save_draft))
        .route("/sections", post(add_section))
        .route("/sections/{section_id}", delete(remove_section))
        .route("/sections/{section_id}/move", post(move_section))
        .route("/sections/{section}/visibility", put(set_visibility))
        .merge(media_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

pub fn profile_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/{handle}", get(get_public_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), identify_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/{handle}/draft", draft_router(state))
}

pub fn router(state: AppState) -> Router<AppState> {
    let vanity_routes = Router::new()
        .route("/{handle}", get(get_public_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), identify_middleware));

    Router::new()
        .nest("/auth", auth_router(state.clone()))
        .nest("/profiles", profile_router(state))
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(docs_ui))
        .merge(vanity_routes)
}

pub fn create_app(config: &AppConfig, state: AppState) -> Router {
    let cors = build_cors(config);
    Router::new()
        .merge(router(state.clone()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &http::Request<_>| {
                    let request_id = Uuid::now_v7();
                    tracing::info_span!(
                        "http-request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                        request_id = %request_id
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
