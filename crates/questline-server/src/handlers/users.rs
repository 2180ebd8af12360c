use axum::Json;
use axum::extract::State;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use questline_core::User;
use questline_protocol::{CreateUserRequest, UserRecord};
use rusqlite::params;
use sha2::{Digest, Sha256};

use crate::db::role_to_db;
use crate::error::ApiError;
use crate::state::AppState;

fn hash_password(raw: &str) -> String {
    BASE64.encode(Sha256::digest(raw.as_bytes()))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserRecord>, ApiError> {
    let username = request.username.trim();
    if username.len() < 3 || username.len() > 50 {
        return Err(ApiError::bad_request("username must be between 3 and 50 characters"));
    }

    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("email address is invalid"));
    }

    if request.password.len() < 6 {
        return Err(ApiError::bad_request("password must be at least 6 characters"));
    }

    let full_name = request.full_name.trim();
    if full_name.is_empty() || full_name.len() > 100 {
        return Err(ApiError::bad_request("full_name must be between 1 and 100 characters"));
    }

    let db = state.db.lock().await;

    let taken: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
        params![username, email],
        |row| row.get(0),
    )?;
    if taken != 0 {
        return Err(ApiError::conflict("username or email already in use"));
    }

    let user = User::new(username, email, hash_password(&request.password), full_name, request.role);
    db.execute(
        "
        INSERT INTO users (id, username, email, password_hash, full_name, role, created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ",
        params![
            user.id.to_string(),
            user.username,
            user.email,
            user.password_hash,
            user.full_name,
            role_to_db(user.role),
            user.created_at_ms,
            user.updated_at_ms
        ],
    )?;

    Ok(Json(UserRecord {
        user_id: user.id.to_string(),
        username: user.username,
        email: user.email,
        full_name: user.full_name,
        role: user.role,
        created_at_ms: user.created_at_ms,
        updated_at_ms: user.updated_at_ms,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil;
    use questline_core::UserRole;

    fn request(username: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            full_name: "Test User".to_string(),
            role: UserRole::Student,
        }
    }

    #[tokio::test]
    async fn creates_a_user_without_exposing_the_hash() {
        let state = testutil::state();

        let record = create_user(State(state.clone()), Json(request("student1", "s1@test.com")))
            .await
            .expect("create user")
            .0;
        assert_eq!(record.username, "student1");
        assert_eq!(record.role, UserRole::Student);

        let db = state.db.lock().await;
        let stored_hash: String = db
            .query_row("SELECT password_hash FROM users WHERE id = ?1", [&record.user_id], |row| {
                row.get(0)
            })
            .expect("stored user");
        assert_ne!(stored_hash, "secret123");
        assert_eq!(stored_hash, hash_password("secret123"));
    }

    #[tokio::test]
    async fn rejects_duplicate_username() {
        let state = testutil::state();

        create_user(State(state.clone()), Json(request("student1", "s1@test.com")))
            .await
            .expect("first create");
        let err = create_user(State(state.clone()), Json(request("student1", "other@test.com")))
            .await
            .expect_err("duplicate username");
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let state = testutil::state();

        create_user(State(state.clone()), Json(request("student1", "s1@test.com")))
            .await
            .expect("first create");
        let err = create_user(State(state.clone()), Json(request("student2", "s1@test.com")))
            .await
            .expect_err("duplicate email");
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let state = testutil::state();

        let short_username = request("ab", "ok@test.com");
        assert!(create_user(State(state.clone()), Json(short_username)).await.is_err());

        let bad_email = request("student1", "not-an-email");
        assert!(create_user(State(state.clone()), Json(bad_email)).await.is_err());

        let mut short_password = request("student1", "ok@test.com");
        short_password.password = "12345".to_string();
        assert!(create_user(State(state.clone()), Json(short_password)).await.is_err());
    }
}
