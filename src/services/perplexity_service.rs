use reqwest::Client;
use std::env;

use crate::services::llm::LlmError;
use crate::services::openrouter_service::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
};

const PERPLEXITY_URL: &str = "https://api.perplexity.ai/chat/completions";

// Perplexity speaks the same chat-completions dialect as OpenRouter, so the
// request/response types are shared.
pub async fn ask_perplexity(prompt: &str, model: &str) -> Result<String, LlmError> {
    let api_key = env::var("PERPLEXITY_API_KEY")
        .map_err(|_| LlmError::EnvironmentError("PERPLEXITY_API_KEY not set".to_string()))?;

    println!("Sending prompt to Perplexity model: {}...", model);

    let request = ChatCompletionRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    };

    let response = Client::new()
        .post(PERPLEXITY_URL)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError(format!(
            "Perplexity returned {}: {}",
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
