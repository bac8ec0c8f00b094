// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, LoginResponse},
    utils::{
        hash::verify_password,
        jwt::{ADMIN_ROLE, sign_jwt},
    },
};

/// Authenticates the configured admin and returns a JWT token.
///
/// Login is disabled (401) when no admin credentials are configured.
pub async fn login(
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let (Some(username), Some(password_hash)) =
        (&config.admin_username, &config.admin_password_hash)
    else {
        return Err(AppError::AuthError("Admin login is not configured".to_string()));
    };

    // one message for an unknown user and a wrong password
    if &payload.username != username || !verify_password(&payload.password, password_hash)? {
        tracing::warn!("Failed admin login attempt for '{}'", payload.username);
        return Err(AppError::AuthError("Invalid username or password".to_string()));
    }

    let token = sign_jwt(
        username,
        ADMIN_ROLE,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: config.jwt_expiration,
    }))
}
