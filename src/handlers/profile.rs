// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{CurrentUser, ProfileResponse, ProfileUpdate, UpdateProfileRequest},
    state::AppState,
    utils::html::clean_text,
};

/// Get the caller's profile, learning preferences and statistics.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.store.load_user(&user).await?;
    let accuracy = profile.statistics.accuracy();

    Ok(Json(ProfileResponse {
        user: profile,
        accuracy,
    }))
}

/// Update the caller's profile.
///
/// * Name and bio are stripped of markup.
/// * Preference fields that are left out keep their current value.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let learning_preferences = match req.learning_preferences {
        Some(prefs) => {
            let mut merged = state.store.load_user(&user).await?.learning_preferences;
            if let Some(topics) = prefs.favorite_topics {
                merged.favorite_topics = topics;
            }
            if let Some(difficulty) = prefs.preferred_difficulty {
                merged.preferred_difficulty = Some(difficulty);
            }
            if let Some(goal) = prefs.daily_goal {
                merged.daily_goal = Some(goal);
            }
            Some(merged)
        }
        None => None,
    };

    let update = ProfileUpdate {
        full_name: req.full_name.as_deref().map(clean_text),
        bio: req.bio.as_deref().map(clean_text),
        avatar_url: req.avatar_url.map(|url| url.trim().to_string()),
        learning_preferences,
    };

    let updated = state.store.update_profile(&user, &update).await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    let accuracy = updated.statistics.accuracy();
    Ok(Json(ProfileResponse {
        user: updated,
        accuracy,
    }))
}
