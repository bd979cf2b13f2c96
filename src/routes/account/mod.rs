pub mod auth;
pub mod google_auth;
pub mod password_reset;
pub mod profile;
