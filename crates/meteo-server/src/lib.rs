pub mod auth;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod retention;
pub mod seed;
pub mod state;
pub mod weather;
pub mod web;
