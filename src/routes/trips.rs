use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::middleware::auth::Claims;
use crate::models::trip::SavedTrip;
use crate::services::pixabay_service;

const DESTINATION_IMAGE_COUNT: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTripRequest {
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub plan_json: Value,
    pub title: Option<String>,
}

fn parse_user_id(claims: &Claims) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(&claims.user_id)
        .map_err(|_| HttpResponse::BadRequest().json(json!({"error": "Invalid user ID"})))
}

pub async fn save_trip(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    input: web::Json<SaveTripRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let trips: mongodb::Collection<SavedTrip> = client.database(DB_NAME).collection("trips");

    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let input = input.into_inner();
    if input.destination.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Destination is required"}));
    }
    if !input.plan_json.is_object() {
        return HttpResponse::BadRequest().json(json!({"error": "A plan is required"}));
    }

    let title = input
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("Trip to {}", input.destination));

    // Cosmetic lookup; an empty list is fine when Pixabay is down.
    let destination_image_urls =
        pixabay_service::get_destination_images(&input.destination, DESTINATION_IMAGE_COUNT).await;

    let mut trip = SavedTrip {
        id: None,
        user_id,
        destination: input.destination,
        start_date: input.start_date,
        end_date: input.end_date,
        plan_json: input.plan_json,
        saved_at: Some(Utc::now()),
        title,
        destination_image_urls,
    };

    match trips.insert_one(&trip).await {
        Ok(result) => {
            trip.id = result.inserted_id.as_object_id();
            HttpResponse::Created().json(trip)
        }
        Err(err) => {
            eprintln!("Failed to save trip: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to save trip"}))
        }
    }
}

pub async fn my_trips(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let trips: mongodb::Collection<SavedTrip> = client.database(DB_NAME).collection("trips");

    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let cursor = trips
        .find(doc! { "user_id": user_id })
        .sort(doc! { "saved_at": -1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<SavedTrip>>().await {
            Ok(items) => HttpResponse::Ok().json(items),
            Err(err) => {
                eprintln!("Failed to collect trips: {:?}", err);
                HttpResponse::InternalServerError().json(json!({"error": "Failed to load trips"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to query trips: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to load trips"}))
        }
    }
}

pub async fn trip_detail(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();
    let trips: mongodb::Collection<SavedTrip> = client.database(DB_NAME).collection("trips");

    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let trip_id = match ObjectId::parse_str(path.as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::NotFound().json(json!({"error": "Trip not found"})),
    };

    // Scoping the filter by owner makes someone else's trip id look the
    // same as a missing one.
    match trips
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(trip)) => HttpResponse::Ok().json(trip),
        Ok(None) => HttpResponse::NotFound().json(json!({"error": "Trip not found"})),
        Err(err) => {
            eprintln!("Failed to fetch trip: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to load trip"}))
        }
    }
}
