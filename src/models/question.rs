// src/models/question.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::quiz::Difficulty;

/// Every generated question is stored with this type.
pub const MULTIPLE_CHOICE: &str = "multiple_choice";

/// A generated question, held in a staged quiz until it is played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question_text: String,

    /// Option key ("A".."D") to option text. Ordered by key.
    pub options: BTreeMap<String, String>,

    /// Key of the correct option.
    pub correct_answer: String,

    pub explanation: String,

    pub topic: String,

    pub difficulty: Difficulty,
}

impl QuestionDraft {
    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Option texts in key order, as stored on the question record.
    pub fn option_texts(&self) -> Vec<String> {
        self.options.values().cloned().collect()
    }
}

/// Represents the `Question` entity collection: one answered question of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub quiz_id: String,
    pub question_text: String,
    pub question_type: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub user_answer: Option<String>,
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub topic: String,
    pub difficulty: Difficulty,
}

/// Payload for creating a `Question` entity. `quiz_id` is filled in by the
/// recorder once the parent attempt exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestionRecord {
    pub quiz_id: String,
    pub question_text: String,
    pub question_type: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub explanation: String,
    pub topic: String,
    pub difficulty: Difficulty,
}

/// DTO for sending a question to the player (excludes answer and explanation).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub index: usize,
    pub question_text: String,
    pub options: BTreeMap<String, String>,
    pub topic: String,
    pub difficulty: Difficulty,
}

impl PublicQuestion {
    pub fn from_draft(index: usize, draft: &QuestionDraft) -> Self {
        Self {
            index,
            question_text: draft.question_text.clone(),
            options: draft.options.clone(),
            topic: draft.topic.clone(),
            difficulty: draft.difficulty,
        }
    }
}

/// Per-question outcome included in a finished quiz result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_text: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub explanation: String,
    pub topic: String,
    pub difficulty: Difficulty,
}

impl QuestionResult {
    pub fn to_record(&self) -> NewQuestionRecord {
        NewQuestionRecord {
            quiz_id: String::new(),
            question_text: self.question_text.clone(),
            question_type: MULTIPLE_CHOICE.to_string(),
            options: self.options.values().cloned().collect(),
            correct_answer: self.correct_answer.clone(),
            user_answer: self.user_answer.clone(),
            is_correct: self.is_correct,
            explanation: self.explanation.clone(),
            topic: self.topic.clone(),
            difficulty: self.difficulty,
        }
    }
}
