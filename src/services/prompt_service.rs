use serde_json::Value;

use crate::models::plan::PlanTripRequest;

/// Render the date window the way the model is briefed on it, including an
/// inclusive day count.
fn date_range_phrase(req: &PlanTripRequest) -> String {
    match (req.start_date, req.end_date) {
        (Some(start), Some(end)) => {
            if start != end {
                let num_days = (end - start).num_days() + 1;
                format!("from {} to {} ({} days)", start, end, num_days)
            } else {
                format!("on {} (1 day)", start)
            }
        }
        (Some(start), None) => format!("on {} (1 day)", start),
        _ => "an unspecified date range".to_string(),
    }
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

/// Build the single combined research-and-itinerary prompt for a plan
/// request. The model is instructed to answer with one raw JSON object and
/// nothing else; the caller still runs the output through
/// `extract_json_from_response` because models routinely ignore that rule.
pub fn generate_trip_prompt(req: &PlanTripRequest) -> String {
    let destination = &req.destination;
    let date_range = date_range_phrase(req);
    let interests = join_or(&req.interests, "general travel interests");
    let trip_style = join_or(&req.trip_style, "standard");
    let travel_with = join_or(&req.travel_with, "solo traveler");
    let pace = &req.pace;
    let budget = &req.budget;
    let transportation_mode = &req.transportation_mode;

    let mut prompt = format!(
        "You are an expert travel planner and researcher AI assistant. Your task is to create a detailed travel itinerary in JSON format based *only* on the user's preferences provided below. You must perform the necessary research implicitly using your knowledge and capabilities to find relevant places and events.

**User Preferences:**
- Destination: {destination}
- Dates: {date_range}
- Traveler Interests: {interests}
- Trip Style: {trip_style}
- Pace: {pace}
- Budget Level: {budget}
- Primary Transportation Mode: {transportation_mode}
- Travel Companions: {travel_with}

**Your Combined Task & Output Requirements:**

1.  **Implicit Research:** Based *only* on the preferences above, identify key attractions, activities, relevant food/cafe types/locations, and any specific real-world events (concerts, festivals, markets, etc.) occurring in {destination} during the specified dates ({date_range}) that align with the traveler's interests ({interests}), style ({trip_style}), and consider their primary transportation mode ({transportation_mode}). Use your internal knowledge and search capabilities for this. **Do not show the research findings separately.**
2.  **Directly Create JSON Itinerary:** Use the information gathered (implicitly) to construct a day-by-day travel itinerary.
3.  **Strict JSON Output Format:** Format the *entire* output **strictly** as a single JSON object adhering precisely to the format specified below. **ABSOLUTELY NO TEXT BEFORE OR AFTER THE JSON OBJECT.** Your entire response must start with `{{` and end with `}}`.
4.  **Currency Standardization:** For all cost estimates, use USD (US Dollars) as the standard currency, regardless of the destination country. This makes it easier for travelers to compare costs.
5.  **Activity Object Details:** For each activity within the `activities` array in the JSON, include:
    *   `time` (string): Approximate start time in HH:MM format (e.g., \"09:00\", \"13:30\"). Be logical with timing.
    *   `description` (string): User-friendly description using specific names of places/events found during your internal research.
    *   `place_name_for_lookup` (string or null): The specific, **searchable name** of the physical location (e.g., \"Kinkaku-ji\", \"Nishiki Market\"). Use the most common English name suitable for map lookups. Set to `null` or an empty string (`\"\"`) ONLY for general activities like \"Breakfast at Hotel\", \"Free time\", or generic neighborhood explorations without a single point of interest.
    *   `place_details` (object or null, optional): If available, include additional details about the place: `name` (string), `category` (string, e.g. \"restaurant\", \"attraction\", \"museum\", \"cafe\"), `price_level` (number, optional, 1-4).
    *   `cost_estimate` (object, optional): `min` (number, USD), `max` (number, USD), `currency` (always \"USD\").
    *   `ticket_url` (string or null, optional): Direct URL for booking or purchasing tickets if the activity requires it, otherwise `null`.
6.  **Event Integration:** If your research finds relevant specific events (festivals, concerts, markets) happening during the trip dates, integrate them logically into the schedule as activities. Ensure `description` mentions the event and `place_name_for_lookup` is the venue name (if known and searchable).
7.  **Pace Adherence:** Ensure the number and density of activities per day reflect the requested pace ('{pace}'). A 'relaxed' pace should have fewer scheduled items than 'moderate' or 'fast-paced'. Include buffer time or 'Free time' entries for relaxed paces.
8.  **Cost Estimates at Day Level:** For each day, include a `day_cost_estimate` object with `min`, `max`, and `currency` properties (always in USD).
9.  **Overall Cost Breakdown:** Include a `total_cost_estimate` object in the root of the JSON with `min`, `max`, `currency` (always \"USD\") and sub-objects `accommodations`, `food`, `attractions`, `transportation`, `other`, each with `min` and `max` properties in USD.
10. **Destination Information:** Include a `destination_info` object in the root of the JSON with: `country`, `city`, `language`, `currency` (local currency code), `exchange_rate` (local units per 1 USD), `budget_tips` (array of strings), `transportation_options` (array of objects with `name`, `description`, `cost_range`, optional `app_name` and `app_link`), `discount_options` (array of objects with `name`, `description`, `price`, optional `link`), and optional `emergency_info` (`police`, `ambulance`, optional `tourist_police`).
11. **Summary Field:** Include a short, engaging `summary` field within the JSON object (1-2 sentences).
12. **Day Titles:** Provide a meaningful `title` for each day reflecting the main theme or area (e.g., \"Day 1: Arrival and Golden Exploration\").
13. **CRITICAL OUTPUT CONSTRAINT:** Output **ONLY the raw JSON object**. Do not include markdown formatting like ```json ... ```. Do not include any introductory or concluding sentences like \"Here is your itinerary:\". Your response must be *only* the JSON.

**Required JSON Output Format Example:**
"
    );

    prompt.push_str(EXAMPLE_OUTPUT);
    prompt.push_str(
        "\nNow, generate ONLY the JSON itinerary based on the user preferences and your research. Remember the strict output constraint and ensure all cost estimates are in USD.",
    );
    prompt.trim().to_string()
}

const EXAMPLE_OUTPUT: &str = r#"```json
{
"summary": "An immersive cultural journey through Kyoto's temples, gardens, and traditional districts.",
"days": [
    {
    "title": "Day 1: Golden Temples & Zen Gardens",
    "activities": [
        {
        "time": "09:00",
        "description": "Breakfast near the hotel",
        "place_name_for_lookup": null,
        "cost_estimate": { "min": 10, "max": 20, "currency": "USD" }
        },
        {
        "time": "10:00",
        "description": "Visit the stunning Kinkaku-ji (Golden Pavilion)",
        "place_name_for_lookup": "Kinkaku-ji",
        "place_details": { "name": "Kinkaku-ji Temple", "category": "attraction", "price_level": 2 },
        "cost_estimate": { "min": 5, "max": 10, "currency": "USD" },
        "ticket_url": "https://example.com/kinkaku-ji-tickets"
        }
    ],
    "day_cost_estimate": { "min": 50, "max": 100, "currency": "USD" }
    }
],
"destination_info": {
  "country": "Japan",
  "city": "Kyoto",
  "language": "Japanese",
  "currency": "JPY",
  "exchange_rate": 110.5,
  "budget_tips": [
    "Purchase a 1-day bus pass for unlimited travel",
    "Many temples have free areas you can visit without paying entrance fees"
  ],
  "transportation_options": [
    {
      "name": "City Bus",
      "description": "Extensive network covering most tourist sites",
      "cost_range": "$2-3 per ride, $5 for day pass",
      "app_name": "Kyoto Bus Navi",
      "app_link": "https://www2.city.kyoto.lg.jp/kotsu/webguide/en/"
    }
  ],
  "discount_options": [
    {
      "name": "Kyoto Sightseeing Pass",
      "description": "Unlimited bus and subway travel within Kyoto",
      "price": "$8 for 1-day pass"
    }
  ]
},
"total_cost_estimate": {
  "min": 800,
  "max": 1200,
  "currency": "USD",
  "accommodations": { "min": 400, "max": 600 },
  "food": { "min": 150, "max": 250 },
  "attractions": { "min": 100, "max": 150 },
  "transportation": { "min": 50, "max": 100 },
  "other": { "min": 100, "max": 100 }
}
}
```"#;

/// Context needed to ask the model for a replacement activity.
pub struct ReplaceActivityContext<'a> {
    pub message: &'a str,
    pub day_index: usize,
    pub activity_index: usize,
    pub plan: &'a Value,
    pub original_activity: &'a Value,
    pub previous_activity: Option<&'a Value>,
    pub next_activity: Option<&'a Value>,
}

fn plan_preference<'a>(plan: &'a Value, key: &str) -> Option<&'a Value> {
    plan.get("original_request")
        .or_else(|| plan.get("original_request_data"))
        .and_then(|req| req.get(key))
}

fn preference_string(plan: &Value, key: &str, fallback: &str) -> String {
    plan_preference(plan, key)
        .and_then(|v| v.as_str())
        .unwrap_or(fallback)
        .to_string()
}

fn preference_list(plan: &Value, key: &str, fallback: &str) -> String {
    let joined = plan_preference(plan, key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

pub fn replace_activity_prompt(ctx: &ReplaceActivityContext) -> String {
    let destination_info = ctx.plan.get("destination_info").cloned().unwrap_or(Value::Null);
    let destination = destination_info
        .get("city")
        .and_then(|v| v.as_str())
        .unwrap_or("the destination");
    let country = destination_info
        .get("country")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let currency = destination_info
        .get("currency")
        .and_then(|v| v.as_str())
        .unwrap_or("USD");

    let budget = preference_string(ctx.plan, "budget", "Mid-range");
    let pace = preference_string(ctx.plan, "pace", "Moderate");
    let interests = preference_list(ctx.plan, "interests", "not specified");
    let trip_style = preference_list(ctx.plan, "tripStyle", "not specified");
    let transportation =
        preference_string(ctx.plan, "transportationMode", "Walking & Public Transit");

    let original_time = ctx
        .original_activity
        .get("time")
        .and_then(|v| v.as_str())
        .unwrap_or("any suitable time")
        .to_string();

    let original_activity = ctx.original_activity.to_string();
    let previous_activity = ctx
        .previous_activity
        .map(|v| v.to_string())
        .unwrap_or_else(|| "No specific previous activity to consider.".to_string());
    let next_activity = ctx
        .next_activity
        .map(|v| v.to_string())
        .unwrap_or_else(|| "No specific next activity to consider.".to_string());

    format!(
        "You are an expert travel assistant. The user wants to replace an activity in their trip plan for {destination}, {country}.\n\
User message: '{message}'\n\n\
Current Itinerary Context:\n\
- The activity to be replaced (Day {day}, Activity Index {activity}): {original_activity}\n\
- Activity immediately before (if any): {previous_activity}\n\
- Activity immediately after (if any): {next_activity}\n\n\
Trip Plan Details:\n\
- Location: {destination}, {country}\n\
- Local Currency (for AI reference, output must be USD): {currency}\n\
- Original Trip Budget Level: {budget}\n\
- Original Trip Pace: {pace}\n\
- Original Trip Interests: {interests}\n\
- Original Trip Style: {trip_style}\n\
- Original Trip Primary Transportation: {transportation}\n\n\
Task:\n\
1. Analyze the user's request: '{message}'.\n\
2. Consider the original activity's time slot (around {original_time}). Also consider the traveler's original preferences: budget '{budget}', pace '{pace}', interests '{interests}', trip style '{trip_style}', and primary transportation '{transportation}'.\n\
3. IMPORTANT: Evaluate travel time/distance, especially concerning the primary transportation mode ('{transportation}'). If replacing the activity creates a very long travel segment, try to suggest a sequence of 1 to 3 smaller, related activities that can logically fill the time, break up the travel, or provide a better flow. These activities should collectively fit the spirit of the user's request and the overall time window and original preferences.\n\
4. If a simple direct replacement is best, suggest one activity. Ensure it aligns with the traveler's original preferences.\n\
5. Ensure all cost estimates are in USD.\n\n\
Output Format (CRITICAL):\n\
Return ONLY a JSON object. This object must have a key named 'activities'.\n\
- If you suggest a SINGLE replacement, 'activities' should be a JSON OBJECT representing that activity.\n\
- If you suggest a SEQUENCE of replacements, 'activities' should be an ARRAY of JSON OBJECTS, each representing an activity in the sequence.\n\
Each activity object (whether single or in an array) MUST include these keys:\n\
  - 'time': (string, HH:MM format, adjusted logically for the sequence if multiple activities)\n\
  - 'description': (string, detailed description of the new activity)\n\
  - 'place_name_for_lookup': (string or null, specific, concise, searchable name for map lookup. Use null only if truly not applicable, like 'Relax at hotel')\n\
  - 'place_details': (object or null, with 'name': string (official), 'category': string (e.g., 'restaurant', 'museum'), 'price_level': number (optional, 1-4))\n\
  - 'cost_estimate': (object, with 'min': number, 'max': number, 'currency': 'USD')\n\
  - 'ticket_url': (string or null, direct URL for booking if applicable)\n\n\
Example for single activity:\n\
{{ \"activities\": {{ \"time\": \"{original_time}\", \"description\": \"Visit the Colosseum\", ...}} }}\n\
Example for multiple activities:\n\
{{ \"activities\": [ {{ \"time\": \"14:00\", \"description\": \"Quick coffee at a local cafe near Colosseum\", ... }}, {{ \"time\": \"14:45\", \"description\": \"Explore the Roman Forum\", ... }} ] }}\n\
Focus on providing relevant, actionable suggestions.",
        destination = destination,
        country = country,
        currency = currency,
        message = ctx.message,
        day = ctx.day_index + 1,
        activity = ctx.activity_index,
        original_activity = original_activity,
        previous_activity = previous_activity,
        next_activity = next_activity,
        budget = budget,
        pace = pace,
        interests = interests,
        trip_style = trip_style,
        transportation = transportation,
        original_time = original_time,
    )
}

/// Context needed to ask the model for activities to insert into a day.
pub struct AddActivityContext<'a> {
    pub user_query: &'a str,
    pub city: &'a str,
    pub country: &'a str,
    pub current_day_title: &'a str,
    pub existing_activities: &'a [Value],
    pub insert_after: Option<&'a str>,
    pub next_activity: Option<&'a str>,
    pub interests: String,
    pub pace: String,
    pub budget: String,
    pub trip_style: String,
    pub transportation_mode: String,
}

pub fn add_activity_prompt(ctx: &AddActivityContext) -> String {
    let existing = if ctx.existing_activities.is_empty() {
        "This day is currently empty.".to_string()
    } else {
        serde_json::to_string(ctx.existing_activities).unwrap_or_default()
    };

    let insertion_point = match (ctx.insert_after, ctx.next_activity) {
        (Some(before), Some(after)) => format!("between '{}' and '{}'.", before, after),
        (Some(before), None) => format!("after '{}'.", before),
        (None, Some(after)) => format!("before '{}' (as the first activity).", after),
        (None, None) => "at the beginning of the day.".to_string(),
    };

    let location = if ctx.country.is_empty() {
        ctx.city.to_string()
    } else {
        format!("{}, {}", ctx.city, ctx.country)
    };

    format!(
        "You are an expert travel assistant. The user wants to add a new activity to their trip plan for {location} on {day_title}.\n\
User's request: '{query}'\n\n\
Current Itinerary Context for {day_title}:\n\
- Existing activities for this day: {existing}\n\
- The new activity should be added: {insertion_point}\n\n\
Traveler's Original Preferences (use these as primary guidance):\n\
- Interests: {interests}\n\
- Pace: {pace}\n\
- Budget Level: {budget}\n\
- Trip Style: {trip_style}\n\
- Primary Transportation Mode: {transportation}\n\n\
Task:\n\
1. Analyze the user's request: '{query}'.\n\
2. Based on the request and the traveler's preferences, suggest one or more suitable activities. If suggesting multiple, they should be a logical sequence and fit reasonably within a similar time block.\n\
3. Consider the insertion point. The time for the new activity/activities should make sense given the surrounding activities (if any).\n\
4. Ensure the suggestion is feasible with the primary transportation mode '{transportation}'. Avoid suggesting something very far if the user relies on walking or public transport unless it's a significant part of the request.\n\
5. All cost estimates MUST be in USD.\n\n\
Output Format (CRITICAL):\n\
Return ONLY a JSON object. This object MUST have a key named 'activities'.\n\
'activities' should be an ARRAY of JSON OBJECTS, each representing a suggested activity. Return an array even if suggesting only one activity.\n\
Each activity object in the array MUST include these keys:\n\
  - 'time': (string, HH:MM format, e.g., '10:30'. Be logical about this time based on the insertion context. If the day is empty, suggest a reasonable start time. If between activities, suggest a time that fits.)\n\
  - 'description': (string, detailed description of the new activity)\n\
  - 'place_name_for_lookup': (string or null, specific, concise, searchable name for map lookup. Use null only if truly not applicable, like 'Relax at hotel')\n\
  - 'place_details': (object or null, with 'name': string (official), 'category': string (e.g., 'restaurant', 'museum'), 'price_level': number (optional, 1-4))\n\
  - 'cost_estimate': (object, with 'min': number, 'max': number, 'currency': 'USD')\n\
  - 'ticket_url': (string or null, direct URL for booking if applicable)\n\n\
Example for suggesting one activity:\n\
{{ \"activities\": [ {{ \"time\": \"15:00\", \"description\": \"Visit the local art gallery\", ... }} ] }}\n\
Example for suggesting a sequence of two related activities:\n\
{{ \"activities\": [ {{ \"time\": \"15:00\", \"description\": \"Coffee at 'The Cozy Cafe'\", ... }}, {{ \"time\": \"16:00\", \"description\": \"Browse the nearby 'Old Town Bookstore'\", ... }} ] }}\n\
Focus on providing relevant, actionable suggestions that fit the user's request and the day's existing plan.",
        location = location,
        day_title = ctx.current_day_title,
        query = ctx.user_query,
        existing = existing,
        insertion_point = insertion_point,
        interests = ctx.interests,
        pace = ctx.pace,
        budget = ctx.budget,
        trip_style = ctx.trip_style,
        transportation = ctx.transportation_mode,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn request() -> PlanTripRequest {
        serde_json::from_value(json!({
            "destination": "Kyoto",
            "startDate": "2025-04-01",
            "endDate": "2025-04-03",
            "interests": ["Temples", "Food"],
            "tripStyle": ["Cultural"],
            "pace": "relaxed",
            "searchMode": "normal"
        }))
        .unwrap()
    }

    #[test]
    fn date_range_counts_days_inclusively() {
        let req = request();
        assert_eq!(date_range_phrase(&req), "from 2025-04-01 to 2025-04-03 (3 days)");
    }

    #[test]
    fn same_day_trip_is_one_day() {
        let mut req = request();
        req.end_date = req.start_date;
        assert_eq!(date_range_phrase(&req), "on 2025-04-01 (1 day)");
    }

    #[test]
    fn start_only_is_one_day() {
        let mut req = request();
        req.end_date = None;
        assert_eq!(date_range_phrase(&req), "on 2025-04-01 (1 day)");
    }

    #[test]
    fn missing_dates_are_unspecified() {
        let mut req = request();
        req.start_date = None;
        req.end_date = None;
        assert_eq!(date_range_phrase(&req), "an unspecified date range");
    }

    #[test]
    fn trip_prompt_carries_preferences_and_constraints() {
        let prompt = generate_trip_prompt(&request());
        assert!(prompt.contains("- Destination: Kyoto"));
        assert!(prompt.contains("Temples, Food"));
        assert!(prompt.contains("- Travel Companions: solo traveler"));
        assert!(prompt.contains("ONLY the raw JSON object"));
        assert!(prompt.contains("\"day_cost_estimate\""));
        assert!(prompt.ends_with("all cost estimates are in USD."));
    }

    #[test]
    fn empty_lists_fall_back_to_generic_phrases() {
        let mut req = request();
        req.interests.clear();
        req.trip_style.clear();
        let prompt = generate_trip_prompt(&req);
        assert!(prompt.contains("general travel interests"));
        assert!(prompt.contains("- Trip Style: standard"));
    }

    #[test]
    fn replace_prompt_uses_plan_context() {
        let plan = json!({
            "destination_info": {"city": "Rome", "country": "Italy", "currency": "EUR"},
            "original_request": {"budget": "Luxury", "interests": ["History"]}
        });
        let original = json!({"time": "14:00", "description": "Visit the Pantheon"});
        let ctx = ReplaceActivityContext {
            message: "something less crowded",
            day_index: 1,
            activity_index: 2,
            plan: &plan,
            original_activity: &original,
            previous_activity: None,
            next_activity: None,
        };
        let prompt = replace_activity_prompt(&ctx);
        assert!(prompt.contains("Rome, Italy"));
        assert!(prompt.contains("(Day 2, Activity Index 2)"));
        assert!(prompt.contains("around 14:00"));
        assert!(prompt.contains("budget 'Luxury'"));
        assert!(prompt.contains("No specific previous activity to consider."));
    }

    #[test]
    fn add_prompt_describes_insertion_point() {
        let ctx = AddActivityContext {
            user_query: "a coffee stop",
            city: "Lisbon",
            country: "Portugal",
            current_day_title: "Day 2: Alfama",
            existing_activities: &[],
            insert_after: Some("Castle visit"),
            next_activity: Some("Fado dinner"),
            interests: "Food".to_string(),
            pace: "Moderate".to_string(),
            budget: "Mid-range".to_string(),
            trip_style: "standard".to_string(),
            transportation_mode: "Walking & Public Transit".to_string(),
        };
        let prompt = add_activity_prompt(&ctx);
        assert!(prompt.contains("between 'Castle visit' and 'Fado dinner'."));
        assert!(prompt.contains("This day is currently empty."));
        assert!(prompt.contains("Lisbon, Portugal"));
    }

    #[test]
    fn add_prompt_omits_country_when_unknown() {
        let ctx = AddActivityContext {
            user_query: "a tea house",
            city: "Kyoto",
            country: "",
            current_day_title: "Day 1: Arrival",
            existing_activities: &[],
            insert_after: None,
            next_activity: None,
            interests: "general interests".to_string(),
            pace: "Moderate".to_string(),
            budget: "Mid-range".to_string(),
            trip_style: "standard".to_string(),
            transportation_mode: "Walking & Public Transit".to_string(),
        };
        let prompt = add_activity_prompt(&ctx);
        assert!(prompt.contains("trip plan for Kyoto on Day 1: Arrival."));
        assert!(!prompt.contains("Kyoto, "));
    }
}
