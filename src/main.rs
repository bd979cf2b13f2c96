use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use fastplan_api::cache::ResponseCache;
use fastplan_api::db;
use fastplan_api::middleware;
use fastplan_api::routes;
use fastplan_api::services::places_service::GooglePlacesService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let cache = ResponseCache::from_env();
    let places =
        GooglePlacesService::from_env(cache.clone()).expect("GOOGLE_MAPS_API_KEY must be set");

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(places.clone()))
            .service(
                web::scope("/api")
                    // Public routes
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(routes::account::auth::register))
                            .route("/login", web::post().to(routes::account::auth::login))
                            .route(
                                "/google",
                                web::get().to(routes::account::google_auth::google_auth_init),
                            )
                            .route(
                                "/google/callback",
                                web::get().to(routes::account::google_auth::google_auth_callback),
                            )
                            .route(
                                "/password-reset/request",
                                web::post().to(routes::account::password_reset::request_reset),
                            )
                            .route(
                                "/password-reset/confirm/{user_id}/{token}",
                                web::post().to(routes::account::password_reset::confirm_reset),
                            )
                            .service(
                                web::scope("").wrap(middleware::auth::AuthMiddleware).route(
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
                    .route("/place-photo", web::get().to(routes::places::place_photo))
                    // Protected routes
                    .service(
                        web::scope("")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(
                                "/chat/add-activity",
                                web::post().to(routes::chat::add_activity),
                            )
                            .service(
                                web::scope("/profile")
                                    .route("", web::get().to(routes::account::profile::get_profile))
                                    .route(
                                        "/update",
                                        web::put().to(routes::account::profile::update_profile),
                                    ),
                            )
                            .route("/trips/save", web::post().to(routes::trips::save_trip))
                            .route("/my-trips", web::get().to(routes::trips::my_trips))
                            .route("/my-trips/{id}", web::get().to(routes::trips::trip_detail))
                            .route("/activity-note", web::post().to(routes::notes::save_note))
                            .route(
                                "/activity-notes/{trip_id}",
                                web::get().to(routes::notes::trip_notes),
                            ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
