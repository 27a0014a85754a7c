//! Quill Database Layer
//!
//! This crate provides the persistence layer for Quill accounts, posts
//! and comments, using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
