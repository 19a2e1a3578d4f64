// tests/common/mod.rs

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use qurio::{
    config::{Config, StoreBackend},
    error::AppError,
    llm::LlmClient,
    models::{
        question::{NewQuestionRecord, QuestionRecord},
        quiz::{NewQuizAttempt, QuizAttempt},
        user::{CurrentUser, ProfileUpdate, User, UserStatistics},
    },
    quiz::session::QuizSessions,
    routes,
    state::AppState,
    store::{EntityStore, SharedStore, sqlite::SqliteEntityStore},
    utils::jwt::sign_jwt,
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Canned LLM: structured requests get `questions_per_reply` questions whose
/// correct answer is always "A"; chat requests get a fixed sentence.
pub struct StubLlm {
    pub questions_per_reply: usize,
    pub fail: bool,
}

impl StubLlm {
    pub fn new() -> Self {
        Self {
            questions_per_reply: 20,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            questions_per_reply: 0,
            fail: true,
        }
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn invoke(&self, _prompt: &str, schema: Option<&Value>) -> Result<Value, AppError> {
        if self.fail {
            return Err(AppError::Upstream("LLM service unavailable".to_string()));
        }
        if schema.is_none() {
            return Ok(json!("How about History and Science today?"));
        }

        let questions: Vec<Value> = (0..self.questions_per_reply)
            .map(|i| {
                json!({
                    "question_text": format!("Question number {}?", i + 1),
                    "options": {"A": "Right", "B": "Wrong", "C": "Also wrong", "D": "Nope"},
                    "correct_answer": "A",
                    "explanation": "A is right.",
                    "difficulty": "medium"
                })
            })
            .collect();
        Ok(json!({ "questions": questions }))
    }
}

/// Entity store kept in process memory. Never touches a timer, so it is
/// safe to use under a paused tokio clock.
#[derive(Default)]
pub struct MemoryStore {
    quizzes: Mutex<Vec<QuizAttempt>>,
    questions: Mutex<Vec<QuestionRecord>>,
    users: Mutex<HashMap<String, User>>,
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_quiz(
        &self,
        owner: &CurrentUser,
        quiz: &NewQuizAttempt,
    ) -> Result<QuizAttempt, AppError> {
        let mut quizzes = self.quizzes.lock().await;
        let attempt = QuizAttempt {
            id: format!("quiz-{}", quizzes.len() + 1),
            created_by: Some(owner.id.clone()),
            created_date: Some(Utc::now().to_rfc3339()),
            title: quiz.title.clone(),
            topics: quiz.topics.clone(),
            difficulty: quiz.difficulty,
            total_questions: quiz.total_questions,
            correct_answers: quiz.correct_answers,
            score_percentage: quiz.score_percentage,
            time_taken: quiz.time_taken,
            completed_at: quiz.completed_at,
        };
        quizzes.push(attempt.clone());
        Ok(attempt)
    }

    async fn create_question(&self, question: &NewQuestionRecord) -> Result<QuestionRecord, AppError> {
        let mut questions = self.questions.lock().await;
        let record = QuestionRecord {
            id: format!("question-{}", questions.len() + 1),
            quiz_id: question.quiz_id.clone(),
            question_text: question.question_text.clone(),
            question_type: question.question_type.clone(),
            options: question.options.clone(),
            correct_answer: question.correct_answer.clone(),
            user_answer: question.user_answer.clone(),
            is_correct: question.is_correct,
            explanation: question.explanation.clone(),
            topic: question.topic.clone(),
            difficulty: question.difficulty,
        };
        questions.push(record.clone());
        Ok(record)
    }

    async fn list_quizzes(&self, owner: &CurrentUser) -> Result<Vec<QuizAttempt>, AppError> {
        let quizzes = self.quizzes.lock().await;
        Ok(quizzes
            .iter()
            .rev()
            .filter(|q| q.created_by.as_deref() == Some(owner.id.as_str()))
            .cloned()
            .collect())
    }

    async fn list_questions(&self, quiz_id: &str) -> Result<Vec<QuestionRecord>, AppError> {
        let questions = self.questions.lock().await;
        Ok(questions.iter().filter(|q| q.quiz_id == quiz_id).cloned().collect())
    }

    async fn load_user(&self, current: &CurrentUser) -> Result<User, AppError> {
        let mut users = self.users.lock().await;
        Ok(users
            .entry(current.id.clone())
            .or_insert_with(|| User::new(current))
            .clone())
    }

    async fn save_statistics(&self, user_id: &str, statistics: &UserStatistics) -> Result<(), AppError> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.statistics = statistics.clone();
        Ok(())
    }

    async fn update_profile(&self, current: &CurrentUser, update: &ProfileUpdate) -> Result<User, AppError> {
        let mut users = self.users.lock().await;
        let user = users
            .entry(current.id.clone())
            .or_insert_with(|| User::new(current));
        update.apply_to(user);
        Ok(user.clone())
    }
}

/// Memory store whose first `create_quiz` fails, as if the entity API
/// were briefly down.
pub struct DownOnceStore {
    pub inner: MemoryStore,
    down: AtomicBool,
}

impl DownOnceStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::default(),
            down: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl EntityStore for DownOnceStore {
    async fn create_quiz(
        &self,
        owner: &CurrentUser,
        quiz: &NewQuizAttempt,
    ) -> Result<QuizAttempt, AppError> {
        if self.down.swap(false, Ordering::SeqCst) {
            return Err(AppError::Upstream("entity API unavailable".to_string()));
        }
        self.inner.create_quiz(owner, quiz).await
    }

    async fn create_question(&self, question: &NewQuestionRecord) -> Result<QuestionRecord, AppError> {
        self.inner.create_question(question).await
    }

    async fn list_quizzes(&self, owner: &CurrentUser) -> Result<Vec<QuizAttempt>, AppError> {
        self.inner.list_quizzes(owner).await
    }

    async fn list_questions(&self, quiz_id: &str) -> Result<Vec<QuestionRecord>, AppError> {
        self.inner.list_questions(quiz_id).await
    }

    async fn load_user(&self, current: &CurrentUser) -> Result<User, AppError> {
        self.inner.load_user(current).await
    }

    async fn save_statistics(&self, user_id: &str, statistics: &UserStatistics) -> Result<(), AppError> {
        self.inner.save_statistics(user_id, statistics).await
    }

    async fn update_profile(&self, current: &CurrentUser, update: &ProfileUpdate) -> Result<User, AppError> {
        self.inner.update_profile(current, update).await
    }
}

pub fn test_config() -> Config {
    Config {
        store_backend: StoreBackend::Sqlite,
        entity_api_url: String::new(),
        entity_api_key: String::new(),
        llm_api_url: "http://127.0.0.1:9/invoke".to_string(),
        llm_api_key: String::new(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        http_timeout_secs: 5,
        static_dir: None,
    }
}

pub fn test_state(store: SharedStore, llm: Arc<dyn LlmClient>) -> AppState {
    AppState {
        store,
        llm,
        sessions: QuizSessions::new(),
        config: test_config(),
    }
}

pub struct TestApp {
    pub address: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Bearer token for a fresh, unique user.
pub fn new_user_token() -> (String, String) {
    let user_id = format!("user_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let token = sign_jwt(&user_id, &format!("{}@example.com", user_id), JWT_SECRET, 600).unwrap();
    (user_id, token)
}

/// Spawns the app on a random port, backed by an in-memory SQLite store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(StubLlm::new())).await
}

pub async fn spawn_app_with(llm: Arc<dyn LlmClient>) -> TestApp {
    let store = SqliteEntityStore::in_memory()
        .await
        .expect("Failed to create in-memory store");
    spawn_app_with_store(Arc::new(store), llm).await
}

pub async fn spawn_app_with_store(store: SharedStore, llm: Arc<dyn LlmClient>) -> TestApp {
    let state = test_state(store, llm);

    let app = routes::create_router(state.clone());

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        state,
        client: reqwest::Client::new(),
    }
}
