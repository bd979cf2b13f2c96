use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::services::places_service::{GooglePlacesService, PlacesError};

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlacePhotoQuery {
    pub photo_reference: Option<String>,
    pub maxwidth: Option<u32>,
}

pub async fn place_details(
    places: web::Data<GooglePlacesService>,
    query: web::Query<PlaceDetailsQuery>,
) -> impl Responder {
    let query = query
        .into_inner()
        .query
        .unwrap_or_default()
        .trim()
        .to_string();
    if query.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Query parameter is required"}));
    }

    match places.search_place(&query).await {
        Ok(details) => HttpResponse::Ok().json(details),
        Err(PlacesError::NotFound) => {
            HttpResponse::NotFound().json(json!({"error": "No place found for that query"}))
        }
        Err(err) => {
            eprintln!("Place lookup failed for '{}': {}", query, err);
            HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to look up place details"}))
        }
    }
}

// The browser cannot fetch Google photo URLs directly (no CORS headers),
// so the backend fetches the image and streams the bytes back.
pub async fn place_photo(
    places: web::Data<GooglePlacesService>,
    query: web::Query<PlacePhotoQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let Some(photo_reference) = query.photo_reference.filter(|r| !r.trim().is_empty()) else {
        return HttpResponse::BadRequest()
            .json(json!({"error": "photo_reference parameter is required"}));
    };
    let max_width = query.maxwidth.unwrap_or(800);

    let url = places.photo_url(&photo_reference, max_width);
    let response = match reqwest::Client::new().get(&url).send().await {
        Ok(response) => response,
        Err(err) => {
            eprintln!("Photo proxy request failed: {}", err);
            return HttpResponse::BadGateway().json(json!({"error": "Failed to fetch photo"}));
        }
    };

    if !response.status().is_success() {
        eprintln!("Photo proxy upstream returned {}", response.status());
        return HttpResponse::BadGateway().json(json!({"error": "Failed to fetch photo"}));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    match response.bytes().await {
        Ok(bytes) => HttpResponse::Ok().content_type(content_type).body(bytes),
        Err(err) => {
            eprintln!("Photo proxy body read failed: {}", err);
            HttpResponse::BadGateway().json(json!({"error": "Failed to fetch photo"}))
        }
    }
}
