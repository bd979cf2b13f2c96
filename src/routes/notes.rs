use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::middleware::auth::Claims;
use crate::models::trip::{ActivityNote, SavedTrip};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveNoteRequest {
    pub trip_id: String,
    pub day_index: i32,
    pub activity_index: i32,
    pub note: String,
    #[serde(default)]
    pub is_done: bool,
}

fn parse_user_id(claims: &Claims) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(&claims.user_id)
        .map_err(|_| HttpResponse::BadRequest().json(json!({"error": "Invalid user ID"})))
}

async fn owns_trip(
    client: &Client,
    user_id: ObjectId,
    trip_id: ObjectId,
) -> Result<bool, mongodb::error::Error> {
    let trips: mongodb::Collection<SavedTrip> = client.database(DB_NAME).collection("trips");
    Ok(trips
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await?
        .is_some())
}

pub async fn save_note(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    input: web::Json<SaveNoteRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let notes: mongodb::Collection<ActivityNote> =
        client.database(DB_NAME).collection("activity_notes");

    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let input = input.into_inner();
    let trip_id = match ObjectId::parse_str(&input.trip_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(json!({"error": "Invalid trip ID"})),
    };
    if input.day_index < 0 || input.activity_index < 0 {
        return HttpResponse::BadRequest().json(json!({"error": "Indices must be non-negative"}));
    }

    match owns_trip(&client, user_id, trip_id).await {
        Ok(true) => {}
        Ok(false) => return HttpResponse::NotFound().json(json!({"error": "Trip not found"})),
        Err(err) => {
            eprintln!("Failed to check trip ownership: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to save note"}));
        }
    }

    let now = Utc::now();
    let filter = doc! {
        "user_id": user_id,
        "trip_id": trip_id,
        "day_index": input.day_index,
        "activity_index": input.activity_index,
    };
    // One note per activity slot; saving again overwrites.
    let update = doc! {
        "$set": {
            "note": &input.note,
            "is_done": input.is_done,
            "updated_at": now.to_rfc3339(),
        },
        "$setOnInsert": {
            "created_at": now.to_rfc3339(),
        }
    };

    match notes.update_one(filter.clone(), update).upsert(true).await {
        Ok(_) => match notes.find_one(filter).await {
            Ok(Some(note)) => HttpResponse::Ok().json(note),
            Ok(None) => {
                HttpResponse::InternalServerError().json(json!({"error": "Failed to save note"}))
            }
            Err(err) => {
                eprintln!("Failed to fetch saved note: {:?}", err);
                HttpResponse::InternalServerError().json(json!({"error": "Failed to save note"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to upsert note: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to save note"}))
        }
    }
}

pub async fn trip_notes(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();
    let notes: mongodb::Collection<ActivityNote> =
        client.database(DB_NAME).collection("activity_notes");

    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let trip_id = match ObjectId::parse_str(path.as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(json!({"error": "Invalid trip ID"})),
    };

    let cursor = notes
        .find(doc! { "user_id": user_id, "trip_id": trip_id })
        .sort(doc! { "day_index": 1, "activity_index": 1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<ActivityNote>>().await {
            Ok(items) => HttpResponse::Ok().json(items),
            Err(err) => {
                eprintln!("Failed to collect notes: {:?}", err);
                HttpResponse::InternalServerError().json(json!({"error": "Failed to load notes"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to query notes: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to load notes"}))
        }
    }
}
