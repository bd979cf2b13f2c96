use actix_web::{web, HttpResponse, Responder};
use serde_json::{json, Value};

use crate::cache::{make_cache_key, ResponseCache};
use crate::services::llm::{extract_json_from_response, generate_itinerary, LlmError};
use crate::services::prompt_service::generate_trip_prompt;
use crate::models::plan::PlanTripRequest;

const PLAN_CACHE_TTL_SECS: u64 = 3 * 24 * 3600;

/// A usable plan has at least one day and a non-empty summary. Anything
/// else is treated as a failed generation, cached or not.
fn is_valid_plan(plan: &Value) -> bool {
    let has_days = plan
        .get("days")
        .and_then(|days| days.as_array())
        .map(|days| !days.is_empty())
        .unwrap_or(false);
    let has_summary = plan
        .get("summary")
        .and_then(|summary| summary.as_str())
        .map(|summary| !summary.trim().is_empty())
        .unwrap_or(false);
    has_days && has_summary
}

pub async fn plan_trip(
    cache: web::Data<ResponseCache>,
    input: web::Json<PlanTripRequest>,
) -> impl Responder {
    let request = input.into_inner();

    if request.destination.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Destination is required"}));
    }

    let cache_key = make_cache_key(&request);
    if let Some(cached) = cache.get(&cache_key).await {
        match serde_json::from_str::<Value>(&cached) {
            Ok(plan) if is_valid_plan(&plan) => {
                println!("Plan cache hit for {}", cache_key);
                return HttpResponse::Ok().json(plan);
            }
            _ => {
                // Stale or malformed entries are purged so the next request
                // regenerates instead of re-serving garbage.
                eprintln!("Dropping invalid cached plan for {}", cache_key);
                cache.delete(&cache_key).await;
            }
        }
    }

    let prompt = generate_trip_prompt(&request);
    let raw = match generate_itinerary(&prompt, &request.search_mode).await {
        Ok(raw) => raw,
        Err(LlmError::Blocked(reason)) => {
            return HttpResponse::BadRequest().json(json!({
                "error": format!("The request was rejected by the model: {}", reason)
            }));
        }
        Err(err) => {
            eprintln!("Itinerary generation failed: {}", err);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to generate itinerary"}));
        }
    };

    let extracted = extract_json_from_response(&raw);
    let mut plan: Value = match serde_json::from_str(&extracted) {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!(
                "Model output was not valid JSON ({}). First 200 chars: {}",
                err,
                &extracted.chars().take(200).collect::<String>()
            );
            return HttpResponse::InternalServerError()
                .json(json!({"error": "The model returned an unreadable itinerary"}));
        }
    };

    if !is_valid_plan(&plan) {
        eprintln!("Model returned a structurally invalid plan for {}", cache_key);
        return HttpResponse::InternalServerError()
            .json(json!({"error": "The model returned an incomplete itinerary"}));
    }

    // The original preferences ride along so follow-up chat edits can
    // honor them without a second round trip.
    if let Value::Object(ref mut map) = plan {
        match serde_json::to_value(&request) {
            Ok(original) => {
                map.insert("original_request".to_string(), original);
            }
            Err(err) => eprintln!("Could not serialize original request: {}", err),
        }
    }

    match serde_json::to_string(&plan) {
        Ok(serialized) => cache.set_ex(&cache_key, &serialized, PLAN_CACHE_TTL_SECS).await,
        Err(err) => eprintln!("Could not serialize plan for cache: {}", err),
    }

    HttpResponse::Ok().json(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_needs_days_and_summary() {
        let plan = json!({"days": [{"title": "Day 1"}], "summary": "A short trip"});
        assert!(is_valid_plan(&plan));
    }

    #[test]
    fn empty_days_is_invalid() {
        assert!(!is_valid_plan(&json!({"days": [], "summary": "s"})));
    }

    #[test]
    fn missing_or_blank_summary_is_invalid() {
        assert!(!is_valid_plan(&json!({"days": [{"title": "Day 1"}]})));
        assert!(!is_valid_plan(&json!({"days": [{"title": "Day 1"}], "summary": "  "})));
    }

    #[test]
    fn days_must_be_an_array() {
        assert!(!is_valid_plan(&json!({"days": "three", "summary": "s"})));
    }
}
