use actix_web::{web, HttpResponse, Responder};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::services::llm::{extract_json_from_response, refine_itinerary};
use crate::services::prompt_service::{
    add_activity_prompt, replace_activity_prompt, AddActivityContext, ReplaceActivityContext,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceActivityRequest {
    pub message: String,
    pub day_index: usize,
    pub activity_index: usize,
    pub plan: Value,
    pub previous_activity: Option<Value>,
    pub next_activity: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddActivityRequest {
    pub user_query: String,
    pub destination: Option<String>,
    pub current_day_title: Option<String>,
    #[serde(default)]
    pub existing_activities_today: Vec<Value>,
    pub insert_after_description: Option<String>,
    pub next_activity_description: Option<String>,
    #[serde(default)]
    pub original_trip_preferences: Value,
    pub plan: Option<Value>,
}

struct ActivityDefaults {
    time: String,
    cost_min: i64,
    cost_max: i64,
}

fn looks_like_clock_time(value: &str) -> bool {
    Regex::new(r"^\d{1,2}:\d{2}$").unwrap().is_match(value)
}

/// Bring one model-suggested activity up to the shape the frontend
/// renders. Missing description is unrecoverable; everything else gets a
/// default.
fn normalize_activity(activity: Value, defaults: &ActivityDefaults) -> Result<Value, String> {
    let Value::Object(mut map) = activity else {
        return Err("activity is not a JSON object".to_string());
    };

    let description_ok = map
        .get("description")
        .and_then(|d| d.as_str())
        .map(|d| !d.trim().is_empty())
        .unwrap_or(false);
    if !description_ok {
        return Err("activity has no description".to_string());
    }

    let time_ok = map
        .get("time")
        .and_then(|t| t.as_str())
        .map(looks_like_clock_time)
        .unwrap_or(false);
    if !time_ok {
        map.insert("time".to_string(), Value::String(defaults.time.clone()));
    }

    let lookup_name = map
        .get("place_name_for_lookup")
        .and_then(|n| n.as_str())
        .filter(|n| !n.trim().is_empty())
        .map(|n| n.to_string());
    if !map.contains_key("place_name_for_lookup") {
        map.insert("place_name_for_lookup".to_string(), Value::Null);
    }

    let has_place_details = map
        .get("place_details")
        .map(|d| d.is_object())
        .unwrap_or(false);
    if !has_place_details {
        let synthesized = match &lookup_name {
            Some(name) => json!({"name": name, "category": "attraction"}),
            None => Value::Null,
        };
        map.insert("place_details".to_string(), synthesized);
    }

    let cost = map.get("cost_estimate").cloned().unwrap_or(Value::Null);
    let mut cost_map = match cost {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    if !cost_map.get("min").map(|v| v.is_number()).unwrap_or(false) {
        cost_map.insert("min".to_string(), json!(defaults.cost_min));
    }
    if !cost_map.get("max").map(|v| v.is_number()).unwrap_or(false) {
        cost_map.insert("max".to_string(), json!(defaults.cost_max));
    }
    // All estimates are standardized to USD regardless of what the model
    // claims.
    cost_map.insert("currency".to_string(), Value::String("USD".to_string()));
    map.insert("cost_estimate".to_string(), Value::Object(cost_map));

    let ticket_ok = map
        .get("ticket_url")
        .map(|t| t.is_string() || t.is_null())
        .unwrap_or(false);
    if !ticket_ok {
        map.insert("ticket_url".to_string(), Value::Null);
    }

    Ok(Value::Object(map))
}

fn neighbor<'a>(
    supplied: Option<&'a Value>,
    activities: &'a [Value],
    index: Option<usize>,
) -> Option<&'a Value> {
    supplied.or_else(|| index.and_then(|i| activities.get(i)))
}

/// The model may answer with a single activity object or an array of
/// them; downstream always works with an array.
fn activities_as_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

async fn suggest_activities(
    prompt: &str,
    defaults: &ActivityDefaults,
) -> Result<Vec<Value>, HttpResponse> {
    let raw = match refine_itinerary(prompt).await {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("Activity suggestion failed: {}", err);
            return Err(HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to get a suggestion from the model"})));
        }
    };

    let extracted = extract_json_from_response(&raw);
    let parsed: Value = match serde_json::from_str(&extracted) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("Suggestion was not valid JSON: {}", err);
            return Err(HttpResponse::InternalServerError()
                .json(json!({"error": "The model returned an unreadable suggestion"})));
        }
    };

    let Some(activities) = parsed.get("activities").cloned() else {
        return Err(HttpResponse::InternalServerError()
            .json(json!({"error": "The model response had no activities"})));
    };

    let mut normalized = Vec::new();
    for activity in activities_as_array(activities) {
        match normalize_activity(activity, defaults) {
            Ok(activity) => normalized.push(activity),
            Err(reason) => {
                eprintln!("Rejecting suggested activity: {}", reason);
                return Err(HttpResponse::InternalServerError()
                    .json(json!({"error": "The model returned an incomplete activity"})));
            }
        }
    }

    if normalized.is_empty() {
        return Err(HttpResponse::InternalServerError()
            .json(json!({"error": "The model returned no usable activities"})));
    }

    Ok(normalized)
}

pub async fn replace_activity(input: web::Json<ReplaceActivityRequest>) -> impl Responder {
    let request = input.into_inner();

    let Some(days) = request.plan.get("days").and_then(|d| d.as_array()) else {
        return HttpResponse::BadRequest().json(json!({"error": "Plan has no days"}));
    };
    let Some(day) = days.get(request.day_index) else {
        return HttpResponse::BadRequest().json(json!({"error": "Day index out of range"}));
    };
    let Some(activities) = day.get("activities").and_then(|a| a.as_array()) else {
        return HttpResponse::BadRequest().json(json!({"error": "Day has no activities"}));
    };
    let Some(original_activity) = activities.get(request.activity_index) else {
        return HttpResponse::BadRequest().json(json!({"error": "Activity index out of range"}));
    };

    // Client-supplied neighbor context wins; otherwise fall back to the
    // activities adjacent in the plan itself.
    let previous_activity = neighbor(
        request.previous_activity.as_ref(),
        activities,
        request.activity_index.checked_sub(1),
    );
    let next_activity = neighbor(
        request.next_activity.as_ref(),
        activities,
        Some(request.activity_index + 1),
    );

    let original_time = original_activity
        .get("time")
        .and_then(|t| t.as_str())
        .unwrap_or("12:00")
        .to_string();

    let prompt = replace_activity_prompt(&ReplaceActivityContext {
        message: &request.message,
        day_index: request.day_index,
        activity_index: request.activity_index,
        plan: &request.plan,
        original_activity,
        previous_activity,
        next_activity,
    });

    let defaults = ActivityDefaults {
        time: original_time,
        cost_min: 10,
        cost_max: 30,
    };

    match suggest_activities(&prompt, &defaults).await {
        Ok(activities) => HttpResponse::Ok().json(json!({ "activities": activities })),
        Err(response) => response,
    }
}

fn preference_value(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        _ => None,
    }
}

/// Explicit preferences win; otherwise the `original_request` the plan
/// carries from generation time is consulted before falling back.
fn preference(prefs: &Value, plan: &Value, key: &str, fallback: &str) -> String {
    preference_value(prefs.get(key))
        .or_else(|| {
            let original = plan
                .get("original_request")
                .or_else(|| plan.get("original_request_data"))?;
            preference_value(original.get(key))
        })
        .unwrap_or_else(|| fallback.to_string())
}

/// A bare "City, Country" destination string is split on the first comma
/// when the plan carries no country of its own.
fn destination_parts(destination: &str, info_country: &str) -> (String, String) {
    if info_country.is_empty() {
        if let Some((city, country)) = destination.split_once(',') {
            return (city.trim().to_string(), country.trim().to_string());
        }
    }
    (destination.trim().to_string(), info_country.to_string())
}

pub async fn add_activity(input: web::Json<AddActivityRequest>) -> impl Responder {
    let request = input.into_inner();

    let plan = request.plan.clone().unwrap_or(Value::Null);
    let destination_info = plan.get("destination_info").cloned().unwrap_or(Value::Null);

    let named_destination = request
        .destination
        .clone()
        .or_else(|| {
            destination_info
                .get("city")
                .and_then(|c| c.as_str())
                .map(|c| c.to_string())
        })
        .unwrap_or_else(|| "the destination".to_string());
    let info_country = destination_info
        .get("country")
        .and_then(|c| c.as_str())
        .unwrap_or("");
    let (city, country) = destination_parts(&named_destination, info_country);

    let day_title = request
        .current_day_title
        .clone()
        .unwrap_or_else(|| "this day".to_string());

    let prefs = &request.original_trip_preferences;
    let prompt = add_activity_prompt(&AddActivityContext {
        user_query: &request.user_query,
        city: &city,
        country: &country,
        current_day_title: &day_title,
        existing_activities: &request.existing_activities_today,
        insert_after: request.insert_after_description.as_deref(),
        next_activity: request.next_activity_description.as_deref(),
        interests: preference(prefs, &plan, "interests", "general interests"),
        pace: preference(prefs, &plan, "pace", "Moderate"),
        budget: preference(prefs, &plan, "budget", "Mid-range"),
        trip_style: preference(prefs, &plan, "tripStyle", "standard"),
        transportation_mode: preference(
            prefs,
            &plan,
            "transportationMode",
            "Walking & Public Transit",
        ),
    });

    let defaults = ActivityDefaults {
        time: "12:00".to_string(),
        cost_min: 0,
        cost_max: 0,
    };

    match suggest_activities(&prompt, &defaults).await {
        Ok(activities) => HttpResponse::Ok().json(json!({ "activities": activities })),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ActivityDefaults {
        ActivityDefaults {
            time: "14:00".to_string(),
            cost_min: 10,
            cost_max: 30,
        }
    }

    #[test]
    fn fills_missing_fields_with_defaults() {
        let activity = json!({"description": "Walk the old town"});
        let normalized = normalize_activity(activity, &defaults()).unwrap();

        assert_eq!(normalized["time"], "14:00");
        assert_eq!(normalized["cost_estimate"]["min"], 10);
        assert_eq!(normalized["cost_estimate"]["max"], 30);
        assert_eq!(normalized["cost_estimate"]["currency"], "USD");
        assert_eq!(normalized["ticket_url"], Value::Null);
        assert_eq!(normalized["place_details"], Value::Null);
    }

    #[test]
    fn synthesizes_place_details_from_lookup_name() {
        let activity = json!({
            "description": "Visit the cathedral",
            "place_name_for_lookup": "Seville Cathedral"
        });
        let normalized = normalize_activity(activity, &defaults()).unwrap();

        assert_eq!(normalized["place_details"]["name"], "Seville Cathedral");
        assert_eq!(normalized["place_details"]["category"], "attraction");
    }

    #[test]
    fn forces_currency_to_usd() {
        let activity = json!({
            "description": "Lunch",
            "cost_estimate": {"min": 5, "max": 15, "currency": "EUR"}
        });
        let normalized = normalize_activity(activity, &defaults()).unwrap();

        assert_eq!(normalized["cost_estimate"]["currency"], "USD");
        assert_eq!(normalized["cost_estimate"]["min"], 5);
        assert_eq!(normalized["cost_estimate"]["max"], 15);
    }

    #[test]
    fn invalid_time_falls_back_to_default() {
        let activity = json!({"description": "Dinner", "time": "evening"});
        let normalized = normalize_activity(activity, &defaults()).unwrap();
        assert_eq!(normalized["time"], "14:00");

        let activity = json!({"description": "Dinner", "time": "19:30"});
        let normalized = normalize_activity(activity, &defaults()).unwrap();
        assert_eq!(normalized["time"], "19:30");
    }

    #[test]
    fn missing_description_is_an_error() {
        assert!(normalize_activity(json!({"time": "10:00"}), &defaults()).is_err());
        assert!(normalize_activity(json!({"description": "   "}), &defaults()).is_err());
        assert!(normalize_activity(json!("just a string"), &defaults()).is_err());
    }

    #[test]
    fn replace_request_accepts_neighbor_context() {
        let req: ReplaceActivityRequest = serde_json::from_value(json!({
            "message": "somewhere quieter",
            "dayIndex": 0,
            "activityIndex": 1,
            "plan": {"days": []},
            "previousActivity": {"description": "Coffee"},
            "nextActivity": {"description": "Dinner"}
        }))
        .unwrap();

        assert_eq!(req.previous_activity.unwrap()["description"], "Coffee");
        assert_eq!(req.next_activity.unwrap()["description"], "Dinner");
    }

    #[test]
    fn supplied_neighbor_context_wins_over_plan_derived() {
        let activities = vec![
            json!({"description": "Breakfast"}),
            json!({"description": "Museum"}),
            json!({"description": "Dinner"}),
        ];
        let supplied = json!({"description": "Coffee nearby"});

        let chosen = neighbor(Some(&supplied), &activities, Some(0));
        assert_eq!(chosen.unwrap()["description"], "Coffee nearby");

        let derived = neighbor(None, &activities, Some(2));
        assert_eq!(derived.unwrap()["description"], "Dinner");

        assert!(neighbor(None, &activities, Some(9)).is_none());
        assert!(neighbor(None, &activities, None).is_none());
    }

    #[test]
    fn preferences_fall_back_to_the_plan_original_request() {
        let plan = json!({
            "original_request": {"budget": "Luxury", "interests": ["History", "Art"]}
        });

        assert_eq!(preference(&json!({}), &plan, "budget", "Mid-range"), "Luxury");
        assert_eq!(
            preference(&json!({}), &plan, "interests", "general interests"),
            "History, Art"
        );
        assert_eq!(preference(&json!({}), &plan, "pace", "Moderate"), "Moderate");
    }

    #[test]
    fn explicit_preferences_override_the_plan() {
        let plan = json!({"original_request": {"budget": "Luxury"}});
        let prefs = json!({"budget": "Budget"});
        assert_eq!(preference(&prefs, &plan, "budget", "Mid-range"), "Budget");
    }

    #[test]
    fn preference_fallbacks_without_any_source() {
        let none = json!({});
        assert_eq!(
            preference(&none, &Value::Null, "interests", "general interests"),
            "general interests"
        );
        assert_eq!(
            preference(&none, &Value::Null, "tripStyle", "standard"),
            "standard"
        );
    }

    #[test]
    fn combined_destination_splits_into_city_and_country() {
        assert_eq!(
            destination_parts("Paris, France", ""),
            ("Paris".to_string(), "France".to_string())
        );
        assert_eq!(
            destination_parts("Kyoto", ""),
            ("Kyoto".to_string(), String::new())
        );
        // A plan-provided country means the destination is already a city.
        assert_eq!(
            destination_parts("Paris", "France"),
            ("Paris".to_string(), "France".to_string())
        );
    }

    #[test]
    fn single_object_becomes_one_element_array() {
        let single = json!({"description": "x"});
        assert_eq!(activities_as_array(single.clone()), vec![single]);

        let many = json!([{"description": "a"}, {"description": "b"}]);
        assert_eq!(activities_as_array(many).len(), 2);
    }
}
