// src/handlers/session.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::user::CurrentUser,
    quiz::session::{self, SharedRunner, SubmitOutcome, SubmitTrigger},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Option key, e.g. "B".
    pub answer: String,
}

async fn active_runner(state: &AppState, user: &CurrentUser) -> Result<SharedRunner, AppError> {
    state
        .sessions
        .runner(&user.id)
        .await
        .ok_or_else(|| AppError::NoStagedQuiz("No quiz in progress".to_string()))
}

/// Current state of the caller's quiz: question, answers, timer and phase.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let runner = active_runner(&state, &user).await?;
    let view = runner.lock().await.view();
    Ok(Json(view))
}

/// Records (or overwrites) the answer to question `index`.
pub async fn select_answer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(index): Path<usize>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let runner = active_runner(&state, &user).await?;
    let mut guard = runner.lock().await;
    guard.select_answer(index, &req.answer)?;
    Ok(Json(guard.view()))
}

pub async fn next(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let runner = active_runner(&state, &user).await?;
    let mut guard = runner.lock().await;
    guard.advance()?;
    Ok(Json(guard.view()))
}

/// Jumps to question `index`.
pub async fn go_to(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    let runner = active_runner(&state, &user).await?;
    let mut guard = runner.lock().await;
    guard.go_to(index)?;
    Ok(Json(guard.view()))
}

pub async fn previous(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let runner = active_runner(&state, &user).await?;
    let mut guard = runner.lock().await;
    guard.retreat()?;
    Ok(Json(guard.view()))
}

/// Grades and persists the attempt.
///
/// Returns 200 with the result, or 202 when another submission of the same
/// attempt is still running. A failed submission can be retried.
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let runner = active_runner(&state, &user).await?;
    let outcome = session::submit(&state, &user, &runner, SubmitTrigger::User).await?;

    let status = match outcome {
        SubmitOutcome::Completed { .. } => StatusCode::OK,
        SubmitOutcome::InFlight => StatusCode::ACCEPTED,
    };
    Ok((status, Json(outcome)))
}
