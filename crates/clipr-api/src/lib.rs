//! Axum HTTP API server for clip extraction.
//!
//! This crate provides:
//! - The clip endpoint streaming MP4 output as it is encoded
//! - Health, readiness and info endpoints
//! - Environment-driven configuration
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{start_clip, ClipJob};
pub use state::AppState;
