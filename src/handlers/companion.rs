// src/handlers/companion.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    companion::{self, ChatRequest},
    error::AppError,
    llm::SharedLlm,
};

pub async fn list_moods() -> impl IntoResponse {
    Json(companion::moods())
}

/// Topic suggestions for a free-text message. Model failures produce the
/// fallback reply rather than an error.
pub async fn chat(
    State(llm): State<SharedLlm>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    Ok(Json(companion::chat(llm.as_ref(), &req.message).await))
}
