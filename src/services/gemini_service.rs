use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

use crate::services::llm::LlmError;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

fn safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    })
    .collect()
}

/// Send a prompt to the given Gemini model and return its text output.
///
/// An empty string means the model finished normally but produced no
/// content parts (typically safety filtering of the response).
pub async fn ask_gemini(prompt: &str, model: &str) -> Result<String, LlmError> {
    let api_key = env::var("GEMINI_API_KEY")
        .map_err(|_| LlmError::EnvironmentError("GEMINI_API_KEY not set".to_string()))?;

    println!("Sending prompt to model: {}...", model);

    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        model, api_key
    );

    let request = GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        safety_settings: safety_settings(),
    };

    let response = Client::new().post(&url).json(&request).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError(format!(
            "Gemini returned {}: {}",
            status, body
        )));
    }

    let parsed: GenerateContentResponse = response.json().await?;

    if let Some(feedback) = parsed.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            eprintln!("Prompt blocked: {}", reason);
            return Err(LlmError::Blocked(reason));
        }
    }

    let candidate = parsed
        .candidates
        .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
        .ok_or(LlmError::EmptyResponse)?;

    match candidate.finish_reason.as_deref() {
        Some("STOP") | None => {
            let text = candidate
                .content
                .and_then(|content| content.parts)
                .map(|parts| {
                    parts
                        .into_iter()
                        .filter_map(|part| part.text)
                        .collect::<String>()
                })
                .unwrap_or_default();
            Ok(text)
        }
        Some(reason) => {
            eprintln!("Model finished for reason: {}", reason);
            Err(LlmError::Blocked(reason.to_string()))
        }
    }
}
