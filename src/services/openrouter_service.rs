use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

use crate::services::llm::LlmError;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: String,
}

pub async fn ask_openrouter(prompt: &str, model: &str) -> Result<String, LlmError> {
    let api_key = env::var("OPENROUTER_API_KEY")
        .map_err(|_| LlmError::EnvironmentError("OPENROUTER_API_KEY not set".to_string()))?;

    println!("Sending prompt to OpenRouter model: {}...", model);

    let request = ChatCompletionRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    };

    let response = Client::new()
        .post(OPENROUTER_URL)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError(format!(
            "OpenRouter returned {}: {}",
            status, body
        )));
    }

    let parsed: ChatCompletionResponse = response.json().await?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(LlmError::EmptyResponse)
}
