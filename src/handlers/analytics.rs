// src/handlers/analytics.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    analytics::{achievements, dashboard, progress},
    error::AppError,
    models::user::{CurrentUser, UserStatistics},
    state::AppState,
};

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.store.load_user(&user).await?;
    let quizzes = state.store.list_quizzes(&user).await?;

    Ok(Json(dashboard::build(&profile, &quizzes, Utc::now())))
}

/// Progress over the last 7, 30 or 90 days.
///
/// Topic and difficulty breakdowns cover every question the user answered,
/// so this reads the question records of each attempt one by one.
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<progress::ProgressParams>,
) -> Result<impl IntoResponse, AppError> {
    let days = params.range()?;

    let profile = state.store.load_user(&user).await?;
    let quizzes = state.store.list_quizzes(&user).await?;

    let mut questions = Vec::new();
    for quiz in &quizzes {
        questions.extend(state.store.list_questions(&quiz.id).await?);
    }

    Ok(Json(progress::build(
        &profile.statistics,
        &quizzes,
        &questions,
        days,
        Utc::now().date_naive(),
    )))
}

/// Evaluates every badge and saves any that were newly earned.
pub async fn get_achievements(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.store.load_user(&user).await?;
    let quizzes = state.store.list_quizzes(&user).await?;

    let evaluation = achievements::evaluate(&profile.statistics, &quizzes);

    if evaluation.changed {
        let statistics = UserStatistics {
            badges: evaluation.badges.clone(),
            ..profile.statistics.clone()
        };
        state.store.save_statistics(&profile.id, &statistics).await?;
        tracing::info!(
            user_id = %user.id,
            badges = statistics.badges.len(),
            "Saved newly unlocked badges"
        );
    }

    Ok(Json(evaluation.response))
}
