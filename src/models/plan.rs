use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_pace() -> String {
    "moderate".to_string()
}

fn default_budget() -> String {
    "Mid-range".to_string()
}

fn default_transportation() -> String {
    "Walking & Public Transit".to_string()
}

/// Trip preferences posted by the planner form. Field names follow the
/// frontend's camelCase payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTripRequest {
    pub destination: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub trip_style: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default = "default_pace")]
    pub pace: String,
    #[serde(default = "default_budget")]
    pub budget: String,
    #[serde(default = "default_transportation")]
    pub transportation_mode: String,
    #[serde(default)]
    pub travel_with: Vec<String>,
    #[serde(default)]
    pub must_see_attractions: String,
    pub search_mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_payload() {
        let req: PlanTripRequest = serde_json::from_str(
            r#"{
                "destination": "Lisbon",
                "startDate": "2025-06-01",
                "endDate": "2025-06-04",
                "tripStyle": ["Romantic"],
                "interests": ["Food"],
                "transportationMode": "Rental Car",
                "searchMode": "quick"
            }"#,
        )
        .unwrap();

        assert_eq!(req.destination, "Lisbon");
        assert_eq!(req.transportation_mode, "Rental Car");
        assert_eq!(req.pace, "moderate");
        assert_eq!(req.budget, "Mid-range");
        assert!(req.travel_with.is_empty());
    }

    #[test]
    fn search_mode_is_required() {
        let result = serde_json::from_str::<PlanTripRequest>(r#"{"destination": "Lisbon"}"#);
        assert!(result.is_err());
    }
}
