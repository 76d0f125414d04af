use std::time::Duration;

use crate::providers::{ChatMessage, ChatRole, LlmProvider, LlmRequest, LlmResponse, Usage};
use async_trait::async_trait;
use radar_common::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self::with_client(Client::new(), api_key, base_url)
    }

    /// Provider whose HTTP requests give up after `timeout`.
    pub fn with_timeout(api_key: String, base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Agent(format!("failed to build OpenAI http client: {e}")))?;
        Ok(Self::with_client(client, api_key, base_url))
    }

    fn with_client(client: Client, api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let openai_request = convert_request(request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| Error::Agent(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Agent(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| Error::Agent(format!("Failed to parse OpenAI response: {e}")))?;

        convert_response(openai_response)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                debug!("OpenAI health check failed: {e}");
                Ok(false)
            }
        }
    }
}

fn convert_request(request: &LlmRequest) -> OpenAiRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);

    if let Some(system_prompt) = &request.system {
        messages.push(OpenAiMessage {
            role: "system",
            content: system_prompt.clone(),
        });
    }

    messages.extend(request.messages.iter().map(convert_message));

    OpenAiRequest {
        model: request.model.clone(),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

fn convert_message(msg: &ChatMessage) -> OpenAiMessage {
    let role = match msg.role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    };
    OpenAiMessage {
        role,
        content: msg.content.clone(),
    }
}

fn convert_response(response: OpenAiResponse) -> Result<LlmResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::Agent("No choices in response".to_string()))?;

    Ok(LlmResponse {
        text: choice.message.content.unwrap_or_default().trim().to_string(),
        model: response.model,
        usage: response.usage.map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }),
        stop_reason: choice.finish_reason,
    })
}

// Wire format of /chat/completions (non-streaming, text only).
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_puts_system_prompt_first() {
        let mut request = LlmRequest::single_turn("gpt-4o-mini", "hola");
        request.system = Some("eres un analista".into());
        request.max_tokens = Some(600);

        let json = serde_json::to_value(convert_request(&request)).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hola");
        assert_eq!(json["max_tokens"], 600);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = OpenAiProvider::new("k".into(), Some("http://localhost:8080/v1/".into()));
        assert_eq!(provider.base_url, "http://localhost:8080/v1");

        let provider = OpenAiProvider::new("k".into(), Some("  ".into()));
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }
}
