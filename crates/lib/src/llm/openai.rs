//! OpenAI-compatible client: POST {base}/chat/completions with bearer auth.

use crate::llm::{ChatMessage, CompletionBackend};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
    #[error("completion response had no message content")]
    EmptyResponse,
}

impl OpenAiClient {
    pub fn new(base_url: Option<String>, api_key: String, model: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            base_url,
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// POST /chat/completions: non-streaming chat. Returns the first choice's content.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        first_choice_content(data)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.chat(messages).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn first_choice_content(data: ChatResponse) -> Result<String, LlmError> {
    data.choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or(LlmError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage::user("hi")],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "gpt-3.5-turbo");
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"], "hi");
    }

    #[test]
    fn first_choice_content_takes_first() {
        let data: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":" 台中 "}},{"message":{"content":"x"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(data).unwrap(), " 台中 ");
    }

    #[test]
    fn missing_choices_is_empty_response() {
        let data: ChatResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(matches!(
            first_choice_content(data),
            Err(LlmError::EmptyResponse)
        ));
        let data: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            first_choice_content(data),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn new_applies_defaults_and_trims_base() {
        let c = OpenAiClient::new(Some("http://127.0.0.1:9/v1/".to_string()), "k".into(), None);
        assert_eq!(c.base_url, "http://127.0.0.1:9/v1");
        assert_eq!(c.model(), "gpt-3.5-turbo");
        let c = OpenAiClient::new(None, "k".into(), Some("gpt-4o-mini".into()));
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.model(), "gpt-4o-mini");
    }
}
