use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::WriteError;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::middleware::auth::Claims;
use crate::models::account::{User, UserProfile, UserSession};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password2: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    data: web::Data<Arc<Client>>,
    input: web::Json<RegisterRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let users: mongodb::Collection<User> = client.database(DB_NAME).collection("users");
    let profiles: mongodb::Collection<UserProfile> =
        client.database(DB_NAME).collection("profiles");

    let input = input.into_inner();

    if !is_valid_email(&input.email) {
        return HttpResponse::BadRequest().json(json!({"error": "Invalid email address"}));
    }
    if input.password != input.password2 {
        return HttpResponse::BadRequest().json(json!({"error": "Passwords do not match"}));
    }
    if input.password.len() < 8 {
        return HttpResponse::BadRequest()
            .json(json!({"error": "Password must be at least 8 characters"}));
    }
    if input.full_name.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Full name is required"}));
    }

    let password_hash = match bcrypt::hash(&input.password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(err) => {
            eprintln!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to create account"}));
        }
    };

    let curr_time = Utc::now();
    let user = User {
        id: None,
        email: input.email.to_lowercase(),
        password: password_hash,
        last_signin: None,
        failed_signins: Some(0),
        created_at: Some(curr_time),
        updated_at: Some(curr_time),
    };

    match users.insert_one(&user).await {
        Ok(result) => {
            let user_id = match result.inserted_id.as_object_id() {
                Some(id) => id,
                None => {
                    return HttpResponse::InternalServerError()
                        .json(json!({"error": "Failed to create account"}))
                }
            };

            let profile = UserProfile {
                id: None,
                user_id,
                full_name: input.full_name.trim().to_string(),
                visited_countries: Vec::new(),
            };
            if let Err(err) = profiles.insert_one(&profile).await {
                eprintln!("Failed to create profile for {}: {:?}", user.email, err);
            }

            match generate_token(&user.email, user_id) {
                Ok(token) => HttpResponse::Created().json(TokenResponse { auth_token: token }),
                Err(_) => HttpResponse::InternalServerError()
                    .json(json!({"error": "Token generation failed"})),
            }
        }
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(error_info) => match error_info {
                mongodb::error::WriteFailure::WriteError(WriteError { code, .. }) => {
                    if code == 11000 {
                        HttpResponse::Conflict()
                            .json(json!({"error": "An account with this email already exists"}))
                    } else {
                        println!("Error code: {}", code);
                        HttpResponse::InternalServerError()
                            .json(json!({"error": "Failed to create account"}))
                    }
                }
                _ => HttpResponse::InternalServerError()
                    .json(json!({"error": "Failed to create account"})),
            },
            _ => {
                HttpResponse::InternalServerError().json(json!({"error": "Failed to create account"}))
            }
        },
    }
}

pub async fn login(data: web::Data<Arc<Client>>, input: web::Json<LoginRequest>) -> impl Responder {
    let client = data.into_inner();
    let users: mongodb::Collection<User> = client.database(DB_NAME).collection("users");

    let input = input.into_inner();
    let email = input.email.to_lowercase();

    match users.find_one(doc! { "email": &email }).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
                let update = doc! {
                    "$set": {
                        "last_signin": Utc::now().to_rfc3339(),
                        "failed_signins": 0
                    }
                };

                match users.update_one(doc! { "email": &email }, update).await {
                    Ok(_) => {
                        let Some(user_id) = user.id else {
                            return HttpResponse::InternalServerError()
                                .json(json!({"error": "Failed to sign in"}));
                        };
                        match generate_token(&email, user_id) {
                            Ok(token) => {
                                HttpResponse::Ok().json(TokenResponse { auth_token: token })
                            }
                            Err(_) => HttpResponse::InternalServerError()
                                .json(json!({"error": "Token generation failed"})),
                        }
                    }
                    Err(err) => {
                        eprintln!("Failed to update document: {:?}", err);
                        HttpResponse::InternalServerError()
                            .json(json!({"error": "Failed to sign in"}))
                    }
                }
            } else {
                let failed_signins = user.failed_signins.unwrap_or(0) + 1;
                let update = doc! { "$set": { "failed_signins": failed_signins } };

                match users.update_one(doc! { "email": &email }, update).await {
                    Ok(_) => {
                        HttpResponse::Unauthorized().json(json!({"error": "Invalid credentials"}))
                    }
                    Err(err) => {
                        eprintln!("Failed to update failed signins: {:?}", err);
                        HttpResponse::InternalServerError()
                            .json(json!({"error": "Failed to process signin"}))
                    }
                }
            }
        }
        Ok(None) => HttpResponse::Unauthorized().json(json!({"error": "Invalid credentials"})),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to process signin"}))
        }
    }
}

pub async fn user_session(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let users: mongodb::Collection<User> = client.database(DB_NAME).collection("users");
    let profiles: mongodb::Collection<UserProfile> =
        client.database(DB_NAME).collection("profiles");

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(json!({"error": "Invalid user ID"})),
    };

    match users.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => {
            let full_name = match profiles.find_one(doc! { "user_id": user_id }).await {
                Ok(Some(profile)) => profile.full_name,
                Ok(None) => String::new(),
                Err(err) => {
                    eprintln!("Failed to fetch profile: {:?}", err);
                    String::new()
                }
            };

            let session = UserSession {
                id: user_id,
                email: user.email,
                full_name,
                created_at: user.created_at.unwrap_or_else(Utc::now),
            };
            HttpResponse::Ok().json(session)
        }
        Ok(None) => HttpResponse::NotFound().json(json!({"error": "User not found"})),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to fetch user"}))
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    re.unwrap().is_match(email)
}

pub fn generate_token(
    email: &str,
    user_id: ObjectId,
) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "default_secret".to_string());
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        user_id: user_id.to_string(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("traveler@example.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@domain@twice.com"));
        assert!(!is_valid_email("@nouser.com"));
    }
}
