pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod otp;
pub mod routes;
pub mod services;
pub mod state;

pub use error::ApiError;
pub use routes::app;
pub use state::AppState;
