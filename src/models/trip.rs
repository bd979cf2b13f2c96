use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A generated itinerary the user chose to keep. `plan_json` is stored as
/// the model produced it; the backend treats it as opaque beyond the
/// `days`/`summary` envelope check done at generation time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SavedTrip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub plan_json: serde_json::Value,
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub destination_image_urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityNote {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub trip_id: ObjectId,
    pub day_index: i32,
    pub activity_index: i32,
    pub note: String,
    pub is_done: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
