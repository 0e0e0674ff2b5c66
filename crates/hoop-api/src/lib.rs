//! Axum HTTP server for Hoop Vision.
//!
//! This crate provides:
//! - The upload form and the `/analyze` pipeline
//! - Static serving of extracted frames, restricted to the frames root
//! - Background eviction of old frame directories
//! - Request IDs, security headers, rate limiting and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod services;
pub mod state;
pub mod upload;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::FrameJanitor;
pub use state::AppState;
