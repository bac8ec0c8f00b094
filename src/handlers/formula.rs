// src/handlers/formula.rs

use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{error::AppError, utils::formula::normalize};

#[derive(Debug, Deserialize, Validate)]
pub struct NormalizeRequest {
    #[validate(length(max = 10000))]
    pub text: String,
}

/// Converts formula shorthand in arbitrary text to LaTeX markup.
pub async fn normalize_text(
    Json(payload): Json<NormalizeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let normalized = normalize(&payload.text);
    Ok(Json(json!({
        "text": payload.text,
        "normalized": normalized,
    })))
}
