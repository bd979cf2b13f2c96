use regex::Regex;
use std::env;
use std::error::Error;
use std::fmt;

use crate::services::{gemini_service, openrouter_service, perplexity_service};

#[derive(Debug)]
pub enum LlmError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ApiError(String),
    Blocked(String),
    EmptyResponse,
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            LlmError::HttpError(err) => write!(f, "HTTP error: {}", err),
            LlmError::ApiError(msg) => write!(f, "API error: {}", msg),
            LlmError::Blocked(reason) => write!(f, "Prompt blocked: {}", reason),
            LlmError::EmptyResponse => write!(f, "Model returned an empty response"),
        }
    }
}

impl Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::HttpError(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenRouter,
    Perplexity,
}

impl Provider {
    pub fn from_env() -> Self {
        match env::var("LLM_PROVIDER").unwrap_or_default().to_lowercase().as_str() {
            "openrouter" => Provider::OpenRouter,
            "perplexity" => Provider::Perplexity,
            _ => Provider::Gemini,
        }
    }
}

// "normal" and "quick" trade quality for latency; anything else gets the
// strongest model.
fn gemini_model_for(search_mode: &str) -> &'static str {
    match search_mode {
        "normal" => "gemini-2.5-flash-preview-04-17",
        "quick" => "gemini-2.0-flash",
        _ => "gemini-2.5-pro-preview-03-25",
    }
}

/// Send the full itinerary prompt to the configured provider, with the
/// model tier chosen by the request's search mode.
pub async fn generate_itinerary(prompt: &str, search_mode: &str) -> Result<String, LlmError> {
    match Provider::from_env() {
        Provider::Gemini => {
            gemini_service::ask_gemini(prompt, gemini_model_for(search_mode)).await
        }
        Provider::OpenRouter => {
            let model = env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| "google/gemini-2.0-flash-001".to_string());
            openrouter_service::ask_openrouter(prompt, &model).await
        }
        Provider::Perplexity => {
            let model =
                env::var("PERPLEXITY_MODEL").unwrap_or_else(|_| "sonar-pro".to_string());
            perplexity_service::ask_perplexity(prompt, &model).await
        }
    }
}

/// Chat-style refinement (replace/add activity) always uses a fast model.
pub async fn refine_itinerary(prompt: &str) -> Result<String, LlmError> {
    match Provider::from_env() {
        Provider::Gemini => gemini_service::ask_gemini(prompt, "gemini-1.5-flash").await,
        Provider::OpenRouter => {
            let model = env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| "google/gemini-2.0-flash-001".to_string());
            openrouter_service::ask_openrouter(prompt, &model).await
        }
        Provider::Perplexity => {
            let model = env::var("PERPLEXITY_MODEL").unwrap_or_else(|_| "sonar".to_string());
            perplexity_service::ask_perplexity(prompt, &model).await
        }
    }
}

/// Best-effort extraction of a JSON object embedded in model prose.
///
/// Total and deterministic: tries a fenced ```json block first, then the
/// widest `{...}` span, and finally falls back to the trimmed input so the
/// caller can re-validate with a real parse.
pub fn extract_json_from_response(response: &str) -> String {
    let response = response.trim();
    if response.is_empty() {
        return String::new();
    }

    let fence = Regex::new(r"(?is)```json\s*(\{.*?\})\s*```").unwrap();
    if let Some(captures) = fence.captures(response) {
        let potential_json = captures.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if serde_json::from_str::<serde_json::Value>(potential_json).is_ok() {
            return potential_json.to_string();
        }
        println!("Found ```json block, but content is not valid JSON.");
    }

    let first_brace = response.find('{');
    let last_brace = response.rfind('}');
    if let (Some(first), Some(last)) = (first_brace, last_brace) {
        if last >= first {
            let potential_json = response[first..=last].trim();
            if serde_json::from_str::<serde_json::Value>(potential_json).is_ok() {
                return potential_json.to_string();
            }
            println!(
                "Found {{...}} block, but content is not valid JSON (length {}).",
                potential_json.len()
            );
        }
    }

    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json_block() {
        let response = "Here is your itinerary:\n```json\n{\"summary\": \"ok\", \"days\": []}\n```\nEnjoy!";
        assert_eq!(
            extract_json_from_response(response),
            "{\"summary\": \"ok\", \"days\": []}"
        );
    }

    #[test]
    fn fence_matching_is_case_insensitive() {
        let response = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(extract_json_from_response(response), "{\"a\": 1}");
    }

    #[test]
    fn fenced_block_spans_newlines() {
        let response = "```json\n{\"a\": 1,\n \"b\": [2,\n 3]}\n```";
        assert_eq!(extract_json_from_response(response), "{\"a\": 1,\n \"b\": [2,\n 3]}");
    }

    #[test]
    fn falls_back_to_brace_span() {
        let response = "The plan follows. {\"days\": [], \"summary\": \"short\"} Hope it helps.";
        assert_eq!(
            extract_json_from_response(response),
            "{\"days\": [], \"summary\": \"short\"}"
        );
    }

    #[test]
    fn invalid_fence_falls_through_to_brace_span() {
        let response = "```json\n{not json}\n``` but later {\"ok\": true} appears";
        // The fenced content fails to parse; the brace scan picks up the
        // widest span, which includes the bad fence, so the original text
        // comes back trimmed for the caller to reject.
        assert_eq!(extract_json_from_response(response), response.trim());
    }

    #[test]
    fn returns_trimmed_input_when_no_json_found() {
        assert_eq!(extract_json_from_response("  no braces here  "), "no braces here");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(extract_json_from_response(""), "");
        assert_eq!(extract_json_from_response("   \n  "), "");
    }

    #[test]
    fn bare_json_object_passes_through() {
        let response = "{\"days\": [{\"title\": \"Day 1\"}], \"summary\": \"s\"}";
        assert_eq!(extract_json_from_response(response), response);
    }

    #[test]
    fn model_tier_tracks_search_mode() {
        assert_eq!(gemini_model_for("normal"), "gemini-2.5-flash-preview-04-17");
        assert_eq!(gemini_model_for("quick"), "gemini-2.0-flash");
        assert_eq!(gemini_model_for("deep"), "gemini-2.5-pro-preview-03-25");
    }
}
