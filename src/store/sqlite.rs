// src/store/sqlite.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    SqlitePool,
    prelude::FromRow,
    sqlite::SqlitePoolOptions,
    types::Json,
};

use crate::{
    error::AppError,
    models::{
        question::{NewQuestionRecord, QuestionRecord},
        quiz::{NewQuizAttempt, QuizAttempt},
        user::{CurrentUser, LearningPreferences, ProfileUpdate, User, UserStatistics},
    },
    store::EntityStore,
};

/// Entity store backed by a local SQLite database.
#[derive(Clone)]
pub struct SqliteEntityStore {
    pool: SqlitePool,
}

/// Represents the 'quizzes' table.
#[derive(FromRow)]
struct QuizRow {
    id: String,
    created_by: String,
    created_date: String,
    title: String,
    topics: Json<Vec<String>>,
    difficulty: String,
    total_questions: i64,
    correct_answers: i64,
    score_percentage: i64,
    time_taken: Option<i64>,
    completed_at: DateTime<Utc>,
}

impl TryFrom<QuizRow> for QuizAttempt {
    type Error = AppError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        Ok(QuizAttempt {
            id: row.id,
            created_by: Some(row.created_by),
            created_date: Some(row.created_date),
            title: row.title,
            topics: row.topics.0,
            difficulty: row
                .difficulty
                .parse()
                .map_err(AppError::InternalServerError)?,
            total_questions: row.total_questions as u32,
            correct_answers: row.correct_answers as u32,
            score_percentage: row.score_percentage as u32,
            time_taken: row.time_taken.map(|t| t as u32),
            completed_at: row.completed_at,
        })
    }
}

/// Represents the 'questions' table.
#[derive(FromRow)]
struct QuestionRow {
    id: String,
    quiz_id: String,
    question_text: String,
    question_type: String,
    options: Json<Vec<String>>,
    correct_answer: String,
    user_answer: Option<String>,
    is_correct: bool,
    explanation: String,
    topic: String,
    difficulty: String,
}

impl TryFrom<QuestionRow> for QuestionRecord {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(QuestionRecord {
            id: row.id,
            quiz_id: row.quiz_id,
            question_text: row.question_text,
            question_type: row.question_type,
            options: row.options.0,
            correct_answer: row.correct_answer,
            user_answer: row.user_answer,
            is_correct: row.is_correct,
            explanation: row.explanation,
            topic: row.topic,
            difficulty: row
                .difficulty
                .parse()
                .map_err(AppError::InternalServerError)?,
        })
    }
}

/// Represents the 'users' table. Preferences and statistics are JSON columns.
#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    full_name: String,
    bio: String,
    avatar_url: String,
    learning_preferences: Json<LearningPreferences>,
    statistics: Json<UserStatistics>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            bio: row.bio,
            avatar_url: row.avatar_url,
            learning_preferences: row.learning_preferences.0,
            statistics: row.statistics.0,
        }
    }
}

const QUIZ_COLUMNS: &str = "id, created_by, created_date, title, topics, difficulty, \
     total_questions, correct_answers, score_percentage, time_taken, completed_at";

const QUESTION_COLUMNS: &str = "id, quiz_id, question_text, question_type, options, \
     correct_answer, user_answer, is_correct, explanation, topic, difficulty";

const USER_COLUMNS: &str =
    "id, email, full_name, bio, avatar_url, learning_preferences, statistics";

impl SqliteEntityStore {
    /// Connects to the database at `database_url` and applies migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database. One connection that never expires, so
    /// the data lives as long as the store.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    async fn create_quiz(
        &self,
        owner: &CurrentUser,
        quiz: &NewQuizAttempt,
    ) -> Result<QuizAttempt, AppError> {
        let sql = format!(
            "INSERT INTO quizzes (id, created_by, title, topics, difficulty, total_questions, \
             correct_answers, score_percentage, time_taken, completed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {}",
            QUIZ_COLUMNS
        );

        let row: QuizRow = sqlx::query_as(&sql)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&owner.id)
            .bind(&quiz.title)
            .bind(Json(&quiz.topics))
            .bind(quiz.difficulty.as_str())
            .bind(i64::from(quiz.total_questions))
            .bind(i64::from(quiz.correct_answers))
            .bind(i64::from(quiz.score_percentage))
            .bind(quiz.time_taken.map(i64::from))
            .bind(quiz.completed_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert quiz: {:?}", e);
                AppError::from(e)
            })?;

        row.try_into()
    }

    async fn create_question(&self, question: &NewQuestionRecord) -> Result<QuestionRecord, AppError> {
        let sql = format!(
            "INSERT INTO questions (id, quiz_id, question_text, question_type, options, \
             correct_answer, user_answer, is_correct, explanation, topic, difficulty) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {}",
            QUESTION_COLUMNS
        );

        let row: QuestionRow = sqlx::query_as(&sql)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&question.quiz_id)
            .bind(&question.question_text)
            .bind(&question.question_type)
            .bind(Json(&question.options))
            .bind(&question.correct_answer)
            .bind(&question.user_answer)
            .bind(question.is_correct)
            .bind(&question.explanation)
            .bind(&question.topic)
            .bind(question.difficulty.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert question: {:?}", e);
                AppError::from(e)
            })?;

        row.try_into()
    }

    async fn list_quizzes(&self, owner: &CurrentUser) -> Result<Vec<QuizAttempt>, AppError> {
        let sql = format!(
            "SELECT {} FROM quizzes WHERE created_by = ? \
             ORDER BY completed_at DESC, rowid DESC",
            QUIZ_COLUMNS
        );

        let rows: Vec<QuizRow> = sqlx::query_as(&sql)
            .bind(&owner.id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(QuizAttempt::try_from).collect()
    }

    async fn list_questions(&self, quiz_id: &str) -> Result<Vec<QuestionRecord>, AppError> {
        let sql = format!(
            "SELECT {} FROM questions WHERE quiz_id = ? ORDER BY rowid",
            QUESTION_COLUMNS
        );

        let rows: Vec<QuestionRow> = sqlx::query_as(&sql)
            .bind(quiz_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(QuestionRecord::try_from).collect()
    }

    async fn load_user(&self, current: &CurrentUser) -> Result<User, AppError> {
        // Identity lives elsewhere; the first request from a user creates the row.
        sqlx::query("INSERT INTO users (id, email) VALUES (?, ?) ON CONFLICT(id) DO NOTHING")
            .bind(&current.id)
            .bind(&current.email)
            .execute(&self.pool)
            .await?;

        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&current.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn save_statistics(
        &self,
        user_id: &str,
        statistics: &UserStatistics,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET statistics = ? WHERE id = ?")
            .bind(Json(statistics))
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    async fn update_profile(
        &self,
        current: &CurrentUser,
        update: &ProfileUpdate,
    ) -> Result<User, AppError> {
        let mut user = self.load_user(current).await?;
        update.apply_to(&mut user);

        sqlx::query(
            "UPDATE users SET full_name = ?, bio = ?, avatar_url = ?, learning_preferences = ? \
             WHERE id = ?",
        )
        .bind(&user.full_name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(Json(&user.learning_preferences))
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }
}
