pub mod cache;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
