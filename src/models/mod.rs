pub mod account;
pub mod google_auth;
pub mod place;
pub mod plan;
pub mod trip;
