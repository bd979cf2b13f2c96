use actix_web::{http::header, web, HttpResponse, Responder};
use bson::doc;
use chrono::Utc;
use mongodb::Client;
use oauth2::AuthorizationCode;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::models::account::{User, UserProfile};
use crate::models::google_auth::GoogleAuthCallbackParams;
use crate::routes::account::auth::generate_token;
use crate::services::google_auth_service::{
    create_google_oauth_client, exchange_code_for_token, get_google_auth_url, get_google_user_info,
};

// Initiate Google OAuth flow
pub async fn google_auth_init() -> impl Responder {
    println!("Initiating Google OAuth flow...");
    let client = create_google_oauth_client();
    let (auth_url, _csrf_token) = get_google_auth_url(&client);

    // The CSRF token rides through the OAuth state parameter; the frontend
    // session is established only after the callback issues our own JWT.

    HttpResponse::Found()
        .insert_header((header::LOCATION, auth_url.to_string()))
        .finish()
}

fn redirect_with_token(token: &str) -> HttpResponse {
    let frontend_url =
        std::env::var("FRONTEND_URL").unwrap_or("http://localhost:3000".to_string());
    let redirect_url = format!("{}/?token={}", frontend_url, token);

    HttpResponse::Found()
        .insert_header((header::LOCATION, redirect_url))
        .finish()
}

// Handle Google OAuth callback
pub async fn google_auth_callback(
    data: web::Data<Arc<Client>>,
    query: web::Query<GoogleAuthCallbackParams>,
) -> impl Responder {
    if let Some(error) = &query.error {
        eprintln!("OAuth error received: {}", error);
        return HttpResponse::BadRequest().body(format!("OAuth error: {}", error));
    }

    let Some(code) = query.code.clone().filter(|code| !code.is_empty()) else {
        return HttpResponse::BadRequest().body("OAuth error: missing authorization code");
    };

    let client = create_google_oauth_client();
    let code = AuthorizationCode::new(code);

    let access_token = match exchange_code_for_token(&client, code).await {
        Ok(token) => token,
        Err(e) => {
            eprintln!("Failed to exchange code for token: {}", e);
            return HttpResponse::InternalServerError().body(format!("Token error: {}", e));
        }
    };

    let user_info = match get_google_user_info(&access_token).await {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Failed to get user info: {}", e);
            return HttpResponse::InternalServerError().body(format!("User info error: {}", e));
        }
    };

    let db_client = data.into_inner();
    let users: mongodb::Collection<User> = db_client.database(DB_NAME).collection("users");
    let profiles: mongodb::Collection<UserProfile> =
        db_client.database(DB_NAME).collection("profiles");

    let email = user_info.email.to_lowercase();
    let filter = doc! { "email": &email };
    let now = Utc::now();

    match users.find_one(filter.clone()).await {
        Ok(Some(existing_user)) => {
            let update = doc! {
                "$set": {
                    "last_signin": now.to_rfc3339(),
                    "failed_signins": 0
                }
            };

            if let Err(err) = users.update_one(filter, update).await {
                eprintln!("Failed to update user sign-in info: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to update user");
            }

            let Some(user_id) = existing_user.id else {
                return HttpResponse::InternalServerError().body("Failed to read user");
            };
            match generate_token(&existing_user.email, user_id) {
                Ok(token) => redirect_with_token(&token),
                Err(_) => HttpResponse::InternalServerError().body("Failed to generate token"),
            }
        }
        Ok(None) => {
            // No password is set for accounts created through Google
            let new_user = User {
                id: None,
                email: email.clone(),
                password: bcrypt::hash("", bcrypt::DEFAULT_COST).unwrap_or("".to_string()),
                last_signin: Some(now),
                failed_signins: Some(0),
                created_at: Some(now),
                updated_at: Some(now),
            };

            match users.insert_one(&new_user).await {
                Ok(result) => {
                    let Some(user_id) = result.inserted_id.as_object_id() else {
                        return HttpResponse::InternalServerError().body("Failed to create user");
                    };

                    let profile = UserProfile {
                        id: None,
                        user_id,
                        full_name: user_info.name.unwrap_or_default(),
                        visited_countries: Vec::new(),
                    };
                    if let Err(err) = profiles.insert_one(&profile).await {
                        eprintln!("Failed to create profile for {}: {:?}", email, err);
                    }

                    match generate_token(&new_user.email, user_id) {
                        Ok(token) => redirect_with_token(&token),
                        Err(_) => {
                            HttpResponse::InternalServerError().body("Failed to generate token")
                        }
                    }
                }
                Err(err) => {
                    eprintln!("Failed to create user: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to create user")
                }
            }
        }
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Database error")
        }
    }
}
