use serde::{Deserialize, Serialize};

/// Shaped Google Places result returned to the frontend and cached in
/// Redis under `place_details_{query}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub total_ratings: Option<i64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub price_level: Option<i32>,
    pub location: Option<PlaceLocation>,
    pub photos: Vec<String>,
    pub opening_hours: Vec<String>,
    pub reviews: Vec<PlaceReview>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaceLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceReview {
    pub author_name: Option<String>,
    pub rating: Option<f64>,
    pub text: Option<String>,
    pub time: Option<String>,
}
