#![cfg(test)]

use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entities::handle::Handle;
use crate::domain::entities::profile::ProfileDocument;
use crate::infra::state::AppState;

/// A fresh `(handle, email)` pair; handles stay within the 20 character limit.
pub fn unique_credentials() -> (String, String) {
    let id = Uuid::now_v7().as_simple().to_string();
    let suffix = &id[id.len() - 16..];
    let handle = format!("t-{}", suffix);
    let email = format!("{}@test.example", suffix);

    (handle, email)
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Option<Uuid> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE lower(email) = lower($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
        .expect("find user by email")
}

pub async fn delete_user(pool: &PgPool, user_id: Uuid) {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("delete user");
}

pub async fn hash_password(state: &AppState, password: &str) -> String {
    state.hasher.hash_password(password).await.expect("hash password")
}

pub async fn insert_user(pool: &PgPool, handle: &str, email: &str, hashed_password: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, display_name, handle, password) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind("Test User")
    .bind(handle)
    .bind(hashed_password)
    .fetch_one(pool)
    .await
    .expect("insert user")
}

/// Stores the signup default document for `handle`.
pub async fn insert_profile(pool: &PgPool, handle: &str, owner_id: Uuid) -> ProfileDocument {
    let document = ProfileDocument::new_default(
        Handle::parse(handle).expect("valid handle"),
        owner_id.to_string(),
        "Test User",
    );
    let now = Utc::now();
    sqlx::query("INSERT INTO profiles (handle, owner_id, document, created_at, updated_at) VALUES ($1, $2, $3, $4, $4)")
        .bind(handle)
        .bind(owner_id)
        .bind(Json(&document))
        .bind(now)
        .execute(pool)
        .await
        .expect("insert profile");
    document
}

pub async fn profile_document(pool: &PgPool, handle: &str) -> Option<Value> {
    sqlx::query_scalar::<_, Json<Value>>("SELECT document FROM profiles WHERE handle = $1")
        .bind(handle)
        .fetch_optional(pool)
        .await
        .expect("select profile")
        .map(|document| document.0)
}

pub fn session_cookie(session_id: Uuid, cookie_name: &str) -> String {
    format!("{}={}", cookie_name, session_id)
}

pub async fn insert_session(pool: &PgPool, user_id: Uuid) -> Uuid {
    sqlx::query_scalar::<_, Uuid>("INSERT INTO sessions (user_id) VALUES ($1) RETURNING id")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("insert session")
}
