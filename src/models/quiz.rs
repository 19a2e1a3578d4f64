// src/models/quiz.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quiz difficulty. Stored lowercase; the capitalized forms the LLM tends to
/// produce are accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Easy")]
    Easy,
    #[default]
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Hard")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// A completed quiz attempt as stored in the `Quiz` entity collection.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: String,

    /// Owner id, filled in by the store.
    #[serde(default)]
    pub created_by: Option<String>,

    /// Store-side creation timestamp, kept as the raw string the store sent.
    #[serde(default)]
    pub created_date: Option<String>,

    /// e.g. "History, Science Quiz".
    pub title: String,

    pub topics: Vec<String>,

    pub difficulty: Difficulty,

    pub total_questions: u32,

    pub correct_answers: u32,

    /// Rounded percentage in 0..=100.
    pub score_percentage: u32,

    /// Seconds spent, only known for timed quizzes.
    #[serde(default)]
    pub time_taken: Option<u32>,

    pub completed_at: DateTime<Utc>,
}

/// Payload for creating a `Quiz` entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuizAttempt {
    pub title: String,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score_percentage: u32,
    pub time_taken: Option<u32>,
    pub completed_at: DateTime<Utc>,
}

impl NewQuizAttempt {
    /// Title shown in history lists, derived from the topics.
    pub fn title_for(topics: &[String]) -> String {
        format!("{} Quiz", topics.join(", "))
    }
}

/// Query parameters for the quiz history endpoint.
#[derive(Debug, Deserialize)]
pub struct QuizListParams {
    pub limit: Option<usize>,
    pub topic: Option<String>,
}
