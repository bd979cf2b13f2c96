pub mod account;
pub mod chat;
pub mod notes;
pub mod places;
pub mod plan;
pub mod trips;
