// src/store/mod.rs

//! Entity persistence.
//!
//! All records live in an entity store with three collections: `Quiz`,
//! `Question` and `User`. Production talks to the hosted entity API
//! ([`remote::RemoteEntityStore`]); development and tests can use a local
//! SQLite file ([`sqlite::SqliteEntityStore`]). Each write is one
//! request/response with no caching and no retry.

pub mod remote;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        question::{NewQuestionRecord, QuestionRecord},
        quiz::{NewQuizAttempt, QuizAttempt},
        user::{CurrentUser, ProfileUpdate, User, UserStatistics},
    },
};

pub type SharedStore = Arc<dyn EntityStore>;

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Creates a `Quiz` record owned by `owner`.
    async fn create_quiz(
        &self,
        owner: &CurrentUser,
        quiz: &NewQuizAttempt,
    ) -> Result<QuizAttempt, AppError>;

    /// Creates one `Question` record. `question.quiz_id` must reference an
    /// existing quiz.
    async fn create_question(&self, question: &NewQuestionRecord) -> Result<QuestionRecord, AppError>;

    /// All attempts of `owner`, newest first.
    async fn list_quizzes(&self, owner: &CurrentUser) -> Result<Vec<QuizAttempt>, AppError>;

    /// Question records of one attempt, in creation order.
    async fn list_questions(&self, quiz_id: &str) -> Result<Vec<QuestionRecord>, AppError>;

    /// Loads the caller's user record.
    async fn load_user(&self, current: &CurrentUser) -> Result<User, AppError>;

    /// Overwrites the statistics block of a user. Last write wins.
    async fn save_statistics(
        &self,
        user_id: &str,
        statistics: &UserStatistics,
    ) -> Result<(), AppError>;

    /// Applies profile changes and returns the updated record.
    async fn update_profile(
        &self,
        current: &CurrentUser,
        update: &ProfileUpdate,
    ) -> Result<User, AppError>;
}
