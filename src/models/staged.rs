// src/models/staged.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{question::QuestionDraft, quiz::Difficulty};

/// Settings chosen in the builder that travel with the staged questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSettings {
    /// Display names, e.g. "History".
    pub topics: Vec<String>,

    pub difficulty: Difficulty,

    /// Countdown length in seconds; `None` means untimed.
    pub time_limit: Option<u32>,

    /// The count that was requested; the generator may return fewer.
    pub total_questions: u32,
}

/// Generated questions plus settings, waiting to be played.
/// Produced by the builder and consumed exactly once by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedQuiz {
    pub questions: Vec<QuestionDraft>,
    pub settings: QuizSettings,
}

/// DTO for building a quiz.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct QuizSetupRequest {
    /// Catalog topic ids.
    #[serde(default)]
    pub topics: Vec<String>,

    #[validate(length(max = 100, message = "Custom topic must be at most 100 characters."))]
    pub custom_topic: Option<String>,

    pub difficulty: Option<Difficulty>,

    #[validate(range(min = 5, max = 50, message = "Question count must be between 5 and 50."))]
    pub question_count: Option<u32>,

    #[validate(range(min = 5, max = 60, message = "Time limit must be between 5 and 60 minutes."))]
    pub time_limit_minutes: Option<u32>,
}

/// What the builder reports back once a quiz is staged. Answers stay hidden.
#[derive(Debug, Serialize)]
pub struct StagedQuizSummary {
    pub settings: QuizSettings,
    pub question_count: usize,
}

impl From<&StagedQuiz> for StagedQuizSummary {
    fn from(staged: &StagedQuiz) -> Self {
        Self {
            settings: staged.settings.clone(),
            question_count: staged.questions.len(),
        }
    }
}
