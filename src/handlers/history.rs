// src/handlers/history.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{quiz::QuizListParams, user::CurrentUser},
    state::AppState,
};

/// List the caller's attempts, newest first.
/// Optional `topic` keeps attempts covering that topic name.
pub async fn list_quizzes(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(50).min(100);

    let quizzes: Vec<_> = state
        .store
        .list_quizzes(&user)
        .await?
        .into_iter()
        .filter(|q| {
            params
                .topic
                .as_deref()
                .is_none_or(|topic| q.topics.iter().any(|t| t.eq_ignore_ascii_case(topic)))
        })
        .take(limit)
        .collect();

    Ok(Json(quizzes))
}

/// Question records of one of the caller's attempts.
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let owned = state
        .store
        .list_quizzes(&user)
        .await?
        .iter()
        .any(|q| q.id == quiz_id);

    if !owned {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let questions = state.store.list_questions(&quiz_id).await?;
    Ok(Json(questions))
}
