use mongodb::{
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, IndexModel,
};
use std::sync::Arc;
use std::time::Duration;

pub const DB_NAME: &str = "fastplan";

pub async fn create_mongo_client(uri: &String) -> Arc<Client> {
    println!("Connecting to MongoDB: {}", uri);

    let mut client_options = ClientOptions::parse(uri)
        .await
        .expect("MongoDB URI may be incorrect! Failed to parse.");

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client =
        Client::with_options(client_options).expect("Failed to create MongoDB client with options");

    match client
        .database(DB_NAME)
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
    {
        Ok(_) => println!("Successfully connected to MongoDB and verified with ping command"),
        Err(e) => {
            eprintln!("WARNING: Connected to MongoDB but ping test failed: {}", e);
            eprintln!("The API may still work, but some functionality might be impaired");
        }
    }

    if let Err(e) = ensure_indexes(&client).await {
        eprintln!("WARNING: Failed to create indexes: {}", e);
    }

    Arc::new(client)
}

// Unique email per user; one note per (user, trip, day, activity) slot.
async fn ensure_indexes(client: &Client) -> mongodb::error::Result<()> {
    let db = client.database(DB_NAME);

    let unique = IndexOptions::builder().unique(true).build();
    db.collection::<mongodb::bson::Document>("users")
        .create_index(
            IndexModel::builder()
                .keys(mongodb::bson::doc! { "email": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    db.collection::<mongodb::bson::Document>("activity_notes")
        .create_index(
            IndexModel::builder()
                .keys(mongodb::bson::doc! {
                    "user_id": 1,
                    "trip_id": 1,
                    "day_index": 1,
                    "activity_index": 1
                })
                .options(unique)
                .build(),
        )
        .await?;

    Ok(())
}
