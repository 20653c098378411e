pub mod agent;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod sanitize;
pub mod state;
pub mod uploads;
