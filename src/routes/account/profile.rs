use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::middleware::auth::Claims;
use crate::models::account::UserProfile;

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub visited_countries: Option<Vec<String>>,
}

fn parse_user_id(claims: &Claims) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(&claims.user_id)
        .map_err(|_| HttpResponse::BadRequest().json(json!({"error": "Invalid user ID"})))
}

pub async fn get_profile(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let profiles: mongodb::Collection<UserProfile> =
        client.database(DB_NAME).collection("profiles");

    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match profiles.find_one(doc! { "user_id": user_id }).await {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => {
            // Accounts created before profiles existed get one lazily.
            let profile = UserProfile {
                id: None,
                user_id,
                full_name: String::new(),
                visited_countries: Vec::new(),
            };
            match profiles.insert_one(&profile).await {
                Ok(_) => HttpResponse::Ok().json(profile),
                Err(err) => {
                    eprintln!("Failed to create profile: {:?}", err);
                    HttpResponse::InternalServerError()
                        .json(json!({"error": "Failed to load profile"}))
                }
            }
        }
        Err(err) => {
            eprintln!("Failed to fetch profile: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to load profile"}))
        }
    }
}

pub async fn update_profile(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    input: web::Json<ProfileUpdate>,
) -> impl Responder {
    let client = data.into_inner();
    let profiles: mongodb::Collection<UserProfile> =
        client.database(DB_NAME).collection("profiles");

    let user_id = match parse_user_id(&claims) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let input = input.into_inner();
    let mut set = doc! {};
    if let Some(full_name) = input.full_name {
        let full_name = full_name.trim().to_string();
        if full_name.is_empty() {
            return HttpResponse::BadRequest().json(json!({"error": "Full name cannot be empty"}));
        }
        set.insert("full_name", full_name);
    }
    if let Some(countries) = input.visited_countries {
        // The list is replaced wholesale; the frontend always sends the
        // complete selection.
        set.insert("visited_countries", countries);
    }

    if set.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Nothing to update"}));
    }

    match profiles
        .update_one(doc! { "user_id": user_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().json(json!({"error": "Profile not found"}))
        }
        Ok(_) => match profiles.find_one(doc! { "user_id": user_id }).await {
            Ok(Some(profile)) => HttpResponse::Ok().json(profile),
            Ok(None) => HttpResponse::NotFound().json(json!({"error": "Profile not found"})),
            Err(err) => {
                eprintln!("Failed to fetch updated profile: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({"error": "Failed to update profile"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to update profile: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to update profile"}))
        }
    }
}
