use crate::models::plan::PlanTripRequest;

/// Fingerprint for a plan request, used as the Redis key for cached
/// itineraries. Lists are joined in the order the client sent them, so two
/// requests that differ only in interest ordering produce distinct keys.
pub fn make_cache_key(req: &PlanTripRequest) -> String {
    let trip_style = req.trip_style.join(",");
    let interests = req.interests.join(",");

    let start_date = req
        .start_date
        .map(|d| d.to_string())
        .unwrap_or_default();
    let end_date = req.end_date.map(|d| d.to_string()).unwrap_or_default();

    format!(
        "trip:{}:{}:{}:{}:{}:{}",
        req.destination, start_date, end_date, req.pace, trip_style, interests
    )
    .to_lowercase()
    .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> PlanTripRequest {
        PlanTripRequest {
            destination: "Kyoto, Japan".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 4, 5),
            trip_style: vec!["Cultural".to_string(), "Foodie".to_string()],
            interests: vec!["Temples".to_string(), "Street Food".to_string()],
            pace: "Relaxed".to_string(),
            budget: "Mid-range".to_string(),
            transportation_mode: "Walking & Public Transit".to_string(),
            travel_with: vec![],
            must_see_attractions: String::new(),
            search_mode: "normal".to_string(),
        }
    }

    #[test]
    fn lowercases_and_replaces_spaces() {
        let key = make_cache_key(&request());
        assert_eq!(
            key,
            "trip:kyoto,_japan:2025-04-01:2025-04-05:relaxed:cultural,foodie:temples,street_food"
        );
    }

    #[test]
    fn missing_dates_render_empty() {
        let mut req = request();
        req.start_date = None;
        req.end_date = None;
        let key = make_cache_key(&req);
        assert!(key.starts_with("trip:kyoto,_japan:::relaxed:"));
    }

    #[test]
    fn list_order_changes_the_key() {
        let mut reordered = request();
        reordered.interests.reverse();
        assert_ne!(make_cache_key(&request()), make_cache_key(&reordered));
    }

    #[test]
    fn empty_lists_render_empty_segments() {
        let mut req = request();
        req.trip_style.clear();
        req.interests.clear();
        assert!(make_cache_key(&req).ends_with("relaxed::"));
    }
}
