//! Quill Authentication and Authorization
//!
//! This crate provides password hashing, signed session tokens, the
//! bearer-token middleware for Axum, and the ownership guard that every
//! mutating handler consults before writing.

pub mod accounts;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;

pub use accounts::{AccountService, LoginOutcome};
pub use error::AuthError;
pub use guard::{Forbidden, GuardError, OwnedResource, authorize_mutation, guard_mutation};
pub use middleware::{auth_middleware, extract_bearer_token, require_auth};
pub use password::{hash_password, verify_password};
pub use token::{Claims, Identity, TokenManager};
