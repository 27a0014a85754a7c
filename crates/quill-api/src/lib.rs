//! Quill REST API
//!
//! This crate provides the Axum-based HTTP API for Quill: registration and
//! login, post and comment CRUD, and the chat endpoint.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::{ApiPath, ApiQuery, Validate, ValidatedJson};
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
