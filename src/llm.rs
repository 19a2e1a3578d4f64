// src/llm.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

pub type SharedLlm = Arc<dyn LlmClient>;

/// The external LLM invocation service.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends a prompt, optionally with a JSON schema the reply should follow.
    ///
    /// Conformance to the schema is not guaranteed; callers parse the reply
    /// best-effort.
    async fn invoke(&self, prompt: &str, response_schema: Option<&Value>) -> Result<Value, AppError>;
}

#[derive(Serialize)]
struct InvokeRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_json_schema: Option<&'a Value>,
}

/// HTTP client for the invocation endpoint.
#[derive(Clone)]
pub struct HttpLlmClient {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpLlmClient {
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn invoke(&self, prompt: &str, response_schema: Option<&Value>) -> Result<Value, AppError> {
        tracing::debug!(prompt_len = prompt.len(), structured = response_schema.is_some(), "Invoking LLM");

        let response = self
            .client
            .post(&self.url)
            .header("api_key", &self.api_key)
            .json(&InvokeRequest {
                prompt,
                response_json_schema: response_schema,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "LLM service returned {}: {}",
                status, body
            )));
        }

        Ok(response.json::<Value>().await?)
    }
}
