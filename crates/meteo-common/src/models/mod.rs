pub mod auth;
pub mod provider;
pub mod user;
pub mod weather;
