//! Axum HTTP API server for KaziConnect.
//!
//! This crate provides:
//! - JWT authentication and Argon2id credential hashing
//! - Role and ownership-chain authorization
//! - Domain services for moderation and notifications
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{ModerationService, Notifier};
pub use state::AppState;
