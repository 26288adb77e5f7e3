pub mod auth;
pub mod cache;
