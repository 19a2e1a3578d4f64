// src/models/user.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::{config::STREAK_THRESHOLD_PERCENTAGE, models::quiz::Difficulty, models::topic};

/// The authenticated caller. Built from the verified token and passed
/// explicitly to every component that needs to know who is acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
}

/// Represents the `User` entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub bio: String,

    #[serde(default)]
    pub avatar_url: String,

    #[serde(default)]
    pub learning_preferences: LearningPreferences,

    #[serde(default)]
    pub statistics: UserStatistics,
}

impl User {
    /// A fresh user with empty statistics.
    pub fn new(current: &CurrentUser) -> Self {
        Self {
            id: current.id.clone(),
            email: current.email.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningPreferences {
    /// Catalog topic ids.
    #[serde(default)]
    pub favorite_topics: Vec<String>,

    #[serde(default)]
    pub preferred_difficulty: Option<Difficulty>,

    /// Questions per day the user aims for.
    #[serde(default)]
    pub daily_goal: Option<u32>,
}

/// Aggregate counters kept on the user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    #[serde(default)]
    pub total_quizzes: u32,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub badges: BTreeSet<String>,
}

impl UserStatistics {
    /// Returns the statistics after one more attempt.
    ///
    /// The streak grows on scores at or above the threshold and resets to 0
    /// otherwise; the longest streak never shrinks.
    pub fn with_attempt(&self, total_questions: u32, correct_answers: u32, score_percentage: u32) -> Self {
        let current_streak = if score_percentage >= STREAK_THRESHOLD_PERCENTAGE {
            self.current_streak + 1
        } else {
            0
        };

        Self {
            total_quizzes: self.total_quizzes + 1,
            total_questions: self.total_questions + total_questions,
            correct_answers: self.correct_answers + correct_answers,
            current_streak,
            longest_streak: self.longest_streak.max(current_streak),
            badges: self.badges.clone(),
        }
    }

    /// Overall accuracy as a rounded percentage, 0 with no questions answered.
    pub fn accuracy(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        (self.correct_answers as f64 / self.total_questions as f64 * 100.0).round() as u32
    }
}

/// DTO for updating the caller's profile. All fields optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters."))]
    pub full_name: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters."))]
    pub bio: Option<String>,

    #[validate(length(max = 500), custom(function = validate_avatar_url))]
    pub avatar_url: Option<String>,

    #[validate(nested)]
    pub learning_preferences: Option<UpdatePreferencesRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePreferencesRequest {
    #[validate(custom(function = validate_topic_ids))]
    pub favorite_topics: Option<Vec<String>>,

    pub preferred_difficulty: Option<Difficulty>,

    #[validate(range(min = 1, max = 50, message = "Daily goal must be between 1 and 50."))]
    pub daily_goal: Option<u32>,
}

/// Sanitized profile changes handed to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_preferences: Option<LearningPreferences>,
}

impl ProfileUpdate {
    /// Applies the changes to a user record.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(bio) = &self.bio {
            user.bio = bio.clone();
        }
        if let Some(avatar_url) = &self.avatar_url {
            user.avatar_url = avatar_url.clone();
        }
        if let Some(prefs) = &self.learning_preferences {
            user.learning_preferences = prefs.clone();
        }
    }
}

/// Profile view: the user plus the derived accuracy.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub accuracy: u32,
}

/// An empty string clears the avatar; anything else must be an absolute URL.
fn validate_avatar_url(url: &str) -> Result<(), validator::ValidationError> {
    if url.is_empty() {
        return Ok(());
    }
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_url")),
    }
}

fn validate_topic_ids(ids: &[String]) -> Result<(), validator::ValidationError> {
    if ids.iter().any(|id| topic::find(id).is_none()) {
        return Err(validator::ValidationError::new("unknown_topic"));
    }
    Ok(())
}
