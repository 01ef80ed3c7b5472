use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::error::AppError;

pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Output format requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    JsonObject,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub format: ResponseFormat,
}

/// External text-generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ChatResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client (OpenAI API or any compatible endpoint).
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn completion_body<'a>(&'a self, request: &'a GenerationRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            response_format: match request.format {
                ResponseFormat::JsonObject => Some(ChatResponseFormat { kind: "json_object" }),
                ResponseFormat::Text => None,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        log::debug!("🤖 Requesting completion from {} ({})", url, self.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(&self.completion_body(request))
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Text generation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Text generation API error: {} {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse completion: {}", e)))?;

        first_choice_content(completion)
    }
}

fn first_choice_content(completion: ChatCompletionResponse) -> Result<String, AppError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AppError::upstream("Text generation returned an empty completion"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new("https://llm.local/v1/", "sk-test", "gpt-4o", Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_json_requests_ask_for_json_object() {
        let c = client();
        let request = GenerationRequest {
            system: "You are Kobun Chino.".into(),
            prompt: "Summarize.".into(),
            format: ResponseFormat::JsonObject,
        };
        let body = serde_json::to_value(c.completion_body(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Summarize.");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(c.base_url, "https://llm.local/v1");
    }

    #[test]
    fn test_text_requests_omit_response_format() {
        let c = client();
        let request = GenerationRequest {
            system: "s".into(),
            prompt: "p".into(),
            format: ResponseFormat::Text,
        };
        let body = serde_json::to_value(c.completion_body(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_completion_content_extraction() {
        let ok: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"a\":1}" } }]
        }))
        .unwrap();
        assert_eq!(first_choice_content(ok).unwrap(), "{\"a\":1}");

        let empty: ChatCompletionResponse =
            serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert!(first_choice_content(empty).is_err());

        let null_content: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{ "message": { "content": null } }]
        }))
        .unwrap();
        assert!(first_choice_content(null_content).is_err());
    }
}
