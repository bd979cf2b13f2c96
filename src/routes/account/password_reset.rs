use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::models::account::{PasswordReset, User};
use crate::routes::account::auth::is_valid_email;
use crate::services::email_service::EmailService;

const RESET_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetConfirm {
    pub password: String,
    pub password2: String,
}

fn generic_ok() -> HttpResponse {
    // Same body whether or not the account exists, so the endpoint cannot
    // be used to probe for registered addresses.
    HttpResponse::Ok().json(json!({
        "message": "If an account with that email exists, a reset link has been sent."
    }))
}

pub async fn request_reset(
    data: web::Data<Arc<Client>>,
    input: web::Json<ResetRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let users: mongodb::Collection<User> = client.database(DB_NAME).collection("users");
    let resets: mongodb::Collection<PasswordReset> =
        client.database(DB_NAME).collection("password_resets");

    let email = input.email.to_lowercase();
    if !is_valid_email(&email) {
        return generic_ok();
    }

    let user = match users.find_one(doc! { "email": &email }).await {
        Ok(Some(user)) => user,
        Ok(None) => return generic_ok(),
        Err(err) => {
            eprintln!("Database error during reset request: {:?}", err);
            return generic_ok();
        }
    };
    let Some(user_id) = user.id else {
        return generic_ok();
    };

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();

    let now = Utc::now();
    let reset = PasswordReset {
        id: None,
        user_id,
        email: email.clone(),
        token: token.clone(),
        expires_at: now + Duration::hours(RESET_TOKEN_TTL_HOURS),
        used: false,
        created_at: now,
    };

    // Older unused tokens for the same account are revoked first.
    let _ = resets
        .delete_many(doc! { "user_id": user_id, "used": false })
        .await;

    if let Err(err) = resets.insert_one(&reset).await {
        eprintln!("Failed to store password reset: {:?}", err);
        return generic_ok();
    }

    let frontend_url =
        std::env::var("FRONTEND_URL").unwrap_or("http://localhost:3000".to_string());
    let reset_link = format!("{}/reset-password/{}/{}", frontend_url, user_id, token);

    match EmailService::new() {
        Ok(mailer) => {
            if let Err(err) = mailer.send_password_reset_email(&email, &reset_link).await {
                eprintln!("Failed to send reset email to {}: {}", email, err);
            }
        }
        Err(err) => eprintln!("Email service unavailable: {}", err),
    }

    generic_ok()
}

pub async fn confirm_reset(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    input: web::Json<ResetConfirm>,
) -> impl Responder {
    let client = data.into_inner();
    let users: mongodb::Collection<User> = client.database(DB_NAME).collection("users");
    let resets: mongodb::Collection<PasswordReset> =
        client.database(DB_NAME).collection("password_resets");

    let (user_id, token) = path.into_inner();
    let user_id = match ObjectId::parse_str(&user_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().json(json!({"error": "Invalid reset link"}))
        }
    };

    if input.password != input.password2 {
        return HttpResponse::BadRequest().json(json!({"error": "Passwords do not match"}));
    }
    if input.password.len() < 8 {
        return HttpResponse::BadRequest()
            .json(json!({"error": "Password must be at least 8 characters"}));
    }

    let reset = match resets
        .find_one(doc! { "user_id": user_id, "token": &token, "used": false })
        .await
    {
        Ok(Some(reset)) => reset,
        Ok(None) => {
            return HttpResponse::BadRequest().json(json!({"error": "Invalid or expired reset link"}))
        }
        Err(err) => {
            eprintln!("Database error during reset confirm: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to reset password"}));
        }
    };

    if reset.expires_at < Utc::now() {
        let _ = resets.delete_one(doc! { "_id": reset.id }).await;
        return HttpResponse::BadRequest().json(json!({"error": "Invalid or expired reset link"}));
    }

    let password_hash = match bcrypt::hash(&input.password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(err) => {
            eprintln!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to reset password"}));
        }
    };

    let update = doc! {
        "$set": {
            "password": password_hash,
            "updated_at": Utc::now().to_rfc3339(),
            "failed_signins": 0
        }
    };
    if let Err(err) = users.update_one(doc! { "_id": user_id }, update).await {
        eprintln!("Failed to update password: {:?}", err);
        return HttpResponse::InternalServerError()
            .json(json!({"error": "Failed to reset password"}));
    }

    if let Err(err) = resets
        .update_one(doc! { "_id": reset.id }, doc! { "$set": { "used": true } })
        .await
    {
        eprintln!("Failed to mark reset token used: {:?}", err);
    }

    HttpResponse::Ok().json(json!({"message": "Password has been reset"}))
}
