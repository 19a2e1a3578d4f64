// src/handlers/quiz.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::AppError,
    models::{
        staged::{QuizSetupRequest, StagedQuizSummary},
        topic::TOPIC_CATEGORIES,
        user::CurrentUser,
    },
    quiz::{builder, session},
    state::AppState,
};

/// Lists the topic catalog offered in quiz setup.
pub async fn list_topics() -> impl IntoResponse {
    Json(TOPIC_CATEGORIES)
}

/// Builds a quiz from the setup form and stages it for the caller.
///
/// * The request is validated while settings are resolved.
/// * Empty topic selections fall back to the user's favorite topics.
/// * Replaces any quiz that was staged but not started.
pub async fn setup(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<QuizSetupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.store.load_user(&user).await?;
    let staged = builder::build(state.llm.as_ref(), &req, &profile).await?;
    let summary = StagedQuizSummary::from(&staged);

    state.sessions.stage(&user.id, staged).await;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Starts the staged quiz. Without one the client is sent back to setup.
pub async fn start(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let runner = session::start_quiz(&state, &user).await?;
    let view = runner.lock().await.view();

    Ok((StatusCode::CREATED, Json(view)))
}
