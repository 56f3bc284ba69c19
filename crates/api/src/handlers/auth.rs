//! Registration, login, and profile handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use db::models::{NewUser, UserPatch};
use db::repository::users;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::validate::{double_option, non_empty};
use crate::AppState;

#[derive(serde::Deserialize)]
pub struct RegisterDto {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct LoginDto {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct UpdateProfileDto {
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub password: Option<Option<String>>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterDto>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = non_empty(payload.email).map(|e| e.to_lowercase());
    let password = payload.password.filter(|p| !p.is_empty());

    let (email, password) = match (email, password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::validation("Email and password are required.")),
    };

    let password_hash = auth::hash_password(&password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let user = users::create_user(
        &state.pool,
        NewUser {
            email,
            password_hash,
            first_name: non_empty(payload.first_name),
            last_name: non_empty(payload.last_name),
        },
    )
    .await
    .map_err(|e| match e {
        db::DbError::DuplicateEmail => {
            ApiError::conflict("An account with that email already exists.")
        }
        other => ApiError::from_db(other, "User not found.", "User not found."),
    })?;

    let access_token = state
        .jwt
        .issue_token(user.id)
        .map_err(|e| ApiError::Internal(format!("token issuance failed: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful.",
            "access_token": access_token,
            "user": user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginDto>,
) -> Result<Json<Value>, ApiError> {
    let email = non_empty(payload.email).map(|e| e.to_lowercase());
    let password = payload.password.filter(|p| !p.is_empty());

    let (email, password) = match (email, password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::validation("Email and password are required.")),
    };

    // Unknown email and wrong password produce the same response; neither
    // leaks which half was wrong.
    let user = users::get_user_by_email(&state.pool, &email)
        .await
        .map_err(|e| ApiError::from_db(e, "User not found.", "User not found."))?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password."))?;

    let valid = auth::verify_password(&password, &user.password_hash).unwrap_or(false);
    if !valid {
        return Err(ApiError::unauthorized("Invalid email or password."));
    }

    let access_token = state
        .jwt
        .issue_token(user.id)
        .map_err(|e| ApiError::Internal(format!("token issuance failed: {e}")))?;

    Ok(Json(json!({
        "message": "Login successful.",
        "access_token": access_token,
        "user": user,
    })))
}

pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let user = users::get_user(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::from_db(e, "User not found.", "User not found."))?;

    Ok(Json(json!({
        "message": "Profile retrieved.",
        "user": user,
    })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileDto>,
) -> Result<Json<Value>, ApiError> {
    let mut patch = UserPatch::default();

    if let Some(first_name) = payload.first_name {
        patch.first_name = Some(non_empty(first_name));
    }
    if let Some(last_name) = payload.last_name {
        patch.last_name = Some(non_empty(last_name));
    }
    if let Some(email) = payload.email {
        let email = non_empty(email)
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ApiError::validation("Email cannot be empty."))?;
        patch.email = Some(email);
    }
    if let Some(Some(password)) = payload.password {
        if !password.is_empty() {
            let hash = auth::hash_password(&password)
                .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;
            patch.password_hash = Some(hash);
        }
    }

    let user = users::update_user(&state.pool, user_id, patch)
        .await
        .map_err(|e| ApiError::from_db(e, "User not found.", "User not found."))?;

    Ok(Json(json!({
        "message": "Profile updated.",
        "user": user,
    })))
}
