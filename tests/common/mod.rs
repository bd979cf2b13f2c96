use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, Responder};
use std::sync::Arc;

use fastplan_api::cache::ResponseCache;
use fastplan_api::db::mongo::create_mongo_client;
use fastplan_api::middleware::auth::{AuthMiddleware, Claims};
use fastplan_api::routes;
use fastplan_api::services::places_service::GooglePlacesService;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
    places: GooglePlacesService,
}

impl TestApp {
    pub async fn new() -> Self {
        std::env::set_var("JWT_SECRET", "test_secret");
        std::env::set_var("GOOGLE_MAPS_API_KEY", "test-key");

        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = create_mongo_client(&mongo_uri).await;
        let places = GooglePlacesService::from_env(ResponseCache::disabled())
            .expect("GOOGLE_MAPS_API_KEY was just set");

        Self { client, places }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::new(ResponseCache::disabled()))
            .app_data(web::Data::new(self.places.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(routes::account::auth::register))
                            .route("/login", web::post().to(routes::account::auth::login))
                            .route(
                                "/google/callback",
                                web::get().to(routes::account::google_auth::google_auth_callback),
                            )
                            .route(
                                "/password-reset/confirm/{user_id}/{token}",
                                web::post().to(routes::account::password_reset::confirm_reset),
                            )
                            .service(
                                web::scope("").wrap(AuthMiddleware).route(
                                    "/session",
                                    web::get().to(routes::account::auth::user_session),
                                ),
                            ),
                    )
                    .route("/plan", web::post().to(routes::plan::plan_trip))
                    .route(
                        "/chat/replace-activity",
                        web::post().to(routes::chat::replace_activity),
                    )
                    .route(
                        "/place-details",
                        web::get().to(routes::places::place_details),
                    )
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware)
                            .route("/whoami", web::get().to(whoami))
                            .service(
                                web::scope("/profile").route(
                                    "",
                                    web::get().to(routes::account::profile::get_profile),
                                ),
                            )
                            .route("/trips/save", web::post().to(routes::trips::save_trip))
                            .route("/my-trips", web::get().to(routes::trips::my_trips))
                            .route("/activity-note", web::post().to(routes::notes::save_note))
                            .route(
                                "/activity-notes/{trip_id}",
                                web::get().to(routes::notes::trip_notes),
                            ),
                    ),
            )
    }
}

// Echo route so middleware acceptance can be checked without a database.
async fn whoami(claims: web::ReqData<Claims>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "email": claims.sub,
        "user_id": claims.user_id,
    }))
}

pub fn make_token(email: &str) -> String {
    let user_id = mongodb::bson::oid::ObjectId::new();
    fastplan_api::routes::account::auth::generate_token(email, user_id)
        .expect("token generation should succeed")
}
