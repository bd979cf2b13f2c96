use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::error::Error;
use std::fmt;

use crate::cache::ResponseCache;
use crate::models::place::{PlaceDetails, PlaceLocation, PlaceReview};

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const PHOTO_URL: &str = "https://maps.googleapis.com/maps/api/place/photo";

const DETAILS_FIELDS: &str = "name,formatted_address,rating,user_ratings_total,photo,formatted_phone_number,opening_hours,website,price_level,reviews,geometry";

const PLACE_CACHE_TTL_SECS: u64 = 72 * 3600;
const MAX_PHOTOS: usize = 5;
const PHOTO_MAX_WIDTH: u32 = 800;

#[derive(Debug)]
pub enum PlacesError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ApiError(String),
    NotFound,
}

impl fmt::Display for PlacesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacesError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            PlacesError::HttpError(err) => write!(f, "HTTP error: {}", err),
            PlacesError::ApiError(msg) => write!(f, "Places API error: {}", msg),
            PlacesError::NotFound => write!(f, "No place found for query"),
        }
    }
}

impl Error for PlacesError {}

impl From<reqwest::Error> for PlacesError {
    fn from(err: reqwest::Error) -> Self {
        PlacesError::HttpError(err)
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    results: Option<Vec<TextSearchResult>>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<DetailsResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    name: Option<String>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<i64>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
    price_level: Option<i32>,
    geometry: Option<Geometry>,
    photos: Option<Vec<Photo>>,
    opening_hours: Option<OpeningHours>,
    reviews: Option<Vec<Review>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<GeometryLocation>,
}

#[derive(Debug, Deserialize)]
struct GeometryLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    weekday_text: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Review {
    author_name: Option<String>,
    rating: Option<f64>,
    text: Option<String>,
    relative_time_description: Option<String>,
}

/// Google Places lookups with a 72h Redis cache in front. Place details
/// change rarely, so the long TTL keeps quota usage down.
#[derive(Clone)]
pub struct GooglePlacesService {
    http: Client,
    api_key: String,
    cache: ResponseCache,
}

impl GooglePlacesService {
    pub fn from_env(cache: ResponseCache) -> Result<Self, PlacesError> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY")
            .map_err(|_| PlacesError::EnvironmentError("GOOGLE_MAPS_API_KEY not set".to_string()))?;
        Ok(Self {
            http: Client::new(),
            api_key,
            cache,
        })
    }

    pub fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        format!(
            "{}?maxwidth={}&photo_reference={}&key={}",
            PHOTO_URL, max_width, photo_reference, self.api_key
        )
    }

    /// Resolve a free-text query to shaped place details, consulting the
    /// cache first.
    pub async fn search_place(&self, query: &str) -> Result<PlaceDetails, PlacesError> {
        let cache_key = format!("place_details_{}", query);
        if let Some(cached) = self.cache.get(&cache_key).await {
            match serde_json::from_str::<PlaceDetails>(&cached) {
                Ok(details) => {
                    println!("Place cache hit for '{}'", query);
                    return Ok(details);
                }
                Err(e) => {
                    eprintln!("Dropping unreadable cached place for '{}': {}", query, e);
                    self.cache.delete(&cache_key).await;
                }
            }
        }

        let place_id = self.find_place_id(query).await?;
        let details = self.fetch_details(&place_id).await?;

        match serde_json::to_string(&details) {
            Ok(serialized) => {
                self.cache
                    .set_ex(&cache_key, &serialized, PLACE_CACHE_TTL_SECS)
                    .await
            }
            Err(e) => eprintln!("Could not serialize place details for cache: {}", e),
        }

        Ok(details)
    }

    async fn find_place_id(&self, query: &str) -> Result<String, PlacesError> {
        let response = self
            .http
            .get(TEXT_SEARCH_URL)
            .query(&[("query", query), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlacesError::ApiError(format!(
                "text search returned {}",
                response.status()
            )));
        }

        let parsed: TextSearchResponse = response.json().await?;
        match parsed.status.as_str() {
            "OK" => parsed
                .results
                .and_then(|mut results| {
                    if results.is_empty() {
                        None
                    } else {
                        Some(results.remove(0).place_id)
                    }
                })
                .ok_or(PlacesError::NotFound),
            "ZERO_RESULTS" => Err(PlacesError::NotFound),
            status => Err(PlacesError::ApiError(format!(
                "text search status {}: {}",
                status,
                parsed.error_message.unwrap_or_default()
            ))),
        }
    }

    async fn fetch_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let response = self
            .http
            .get(DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAILS_FIELDS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlacesError::ApiError(format!(
                "details returned {}",
                response.status()
            )));
        }

        let parsed: DetailsResponse = response.json().await?;
        if parsed.status != "OK" {
            return Err(PlacesError::ApiError(format!(
                "details status {}: {}",
                parsed.status,
                parsed.error_message.unwrap_or_default()
            )));
        }
        let result = parsed.result.ok_or(PlacesError::NotFound)?;

        let photos = result
            .photos
            .unwrap_or_default()
            .into_iter()
            .take(MAX_PHOTOS)
            .map(|photo| self.photo_url(&photo.photo_reference, PHOTO_MAX_WIDTH))
            .collect();

        let reviews = result
            .reviews
            .unwrap_or_default()
            .into_iter()
            .map(|review| PlaceReview {
                author_name: review.author_name,
                rating: review.rating,
                text: review.text,
                time: review.relative_time_description,
            })
            .collect();

        Ok(PlaceDetails {
            name: result.name,
            address: result.formatted_address,
            rating: result.rating,
            total_ratings: result.user_ratings_total,
            phone: result.formatted_phone_number,
            website: result.website,
            price_level: result.price_level,
            location: result.geometry.and_then(|g| g.location).map(|loc| PlaceLocation {
                lat: loc.lat,
                lng: loc.lng,
            }),
            photos,
            opening_hours: result
                .opening_hours
                .and_then(|hours| hours.weekday_text)
                .unwrap_or_default(),
            reviews,
        })
    }
}
