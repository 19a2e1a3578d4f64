// src/store/remote.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        question::{NewQuestionRecord, QuestionRecord},
        quiz::{NewQuizAttempt, QuizAttempt},
        user::{CurrentUser, ProfileUpdate, User, UserStatistics},
    },
    store::EntityStore,
};

const QUIZ: &str = "Quiz";
const QUESTION: &str = "Question";
const USER: &str = "User";

/// Client for the hosted entity API.
///
/// Collections live under `{base_url}/entities/{Entity}`. Every request
/// carries the `api_key` header.
#[derive(Clone)]
pub struct RemoteEntityStore {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Body for creating a quiz: the attempt plus its owner.
#[derive(Serialize)]
struct OwnedQuiz<'a> {
    created_by: &'a str,
    #[serde(flatten)]
    quiz: &'a NewQuizAttempt,
}

impl RemoteEntityStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn collection_url(&self, entity: &str) -> String {
        format!("{}/entities/{}", self.base_url, entity)
    }

    fn record_url(&self, entity: &str, id: &str) -> String {
        format!("{}/entities/{}/{}", self.base_url, entity, id)
    }

    /// Question filter for one quiz, oldest first.
    fn questions_request(&self, quiz_id: &str) -> RequestBuilder {
        self.client
            .get(self.collection_url(QUESTION))
            .query(&[("quiz_id", quiz_id), ("sort", "created_date")])
    }

    /// Sends the request and decodes a JSON body, mapping non-2xx replies to
    /// `Upstream` (or `NotFound` for 404).
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = request.header("api_key", &self.api_key).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Entity not found".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "entity API returned {}: {}",
                status, body
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl EntityStore for RemoteEntityStore {
    async fn create_quiz(
        &self,
        owner: &CurrentUser,
        quiz: &NewQuizAttempt,
    ) -> Result<QuizAttempt, AppError> {
        let body = OwnedQuiz {
            created_by: &owner.id,
            quiz,
        };
        self.send(self.client.post(self.collection_url(QUIZ)).json(&body))
            .await
    }

    async fn create_question(&self, question: &NewQuestionRecord) -> Result<QuestionRecord, AppError> {
        self.send(self.client.post(self.collection_url(QUESTION)).json(question))
            .await
    }

    async fn list_quizzes(&self, owner: &CurrentUser) -> Result<Vec<QuizAttempt>, AppError> {
        let request = self
            .client
            .get(self.collection_url(QUIZ))
            .query(&[("created_by", owner.id.as_str()), ("sort", "-created_date")]);
        self.send(request).await
    }

    async fn list_questions(&self, quiz_id: &str) -> Result<Vec<QuestionRecord>, AppError> {
        self.send(self.questions_request(quiz_id)).await
    }

    async fn load_user(&self, current: &CurrentUser) -> Result<User, AppError> {
        self.send(self.client.get(self.record_url(USER, &current.id)))
            .await
    }

    async fn save_statistics(
        &self,
        user_id: &str,
        statistics: &UserStatistics,
    ) -> Result<(), AppError> {
        let request = self
            .client
            .put(self.record_url(USER, user_id))
            .json(&json!({ "statistics": statistics }));
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        current: &CurrentUser,
        update: &ProfileUpdate,
    ) -> Result<User, AppError> {
        self.send(self.client.put(self.record_url(USER, &current.id)).json(update))
            .await
    }
}
