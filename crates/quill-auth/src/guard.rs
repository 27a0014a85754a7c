//! Resource ownership checks
//!
//! Only the account that created a post or comment may change or delete it.
//! Handlers fetch the resource first and pass the result to [`guard_mutation`],
//! which reports a missing resource before it compares owners.

use quill_db::{Comment, Post};
use thiserror::Error;
use tracing::warn;

use crate::token::Identity;

/// The requester is authenticated but does not own the resource
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Not permitted to modify this resource")]
pub struct Forbidden;

/// Outcome of a failed mutation guard
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    #[error("Resource not found")]
    NotFound,

    #[error(transparent)]
    Forbidden(#[from] Forbidden),
}

/// A resource with a recorded owner
pub trait OwnedResource {
    fn owner_id(&self) -> i64;
}

impl OwnedResource for Post {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

impl OwnedResource for Comment {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

/// Allow a mutation only when the requester owns the resource
pub fn authorize_mutation(requester_id: i64, resource_owner_id: i64) -> Result<(), Forbidden> {
    if requester_id == resource_owner_id {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

/// Check a fetched resource before mutating it: absent is `NotFound`, not owned is `Forbidden`
pub fn guard_mutation<R: OwnedResource>(
    identity: &Identity,
    resource: Option<R>,
) -> Result<R, GuardError> {
    let resource = resource.ok_or(GuardError::NotFound)?;

    if let Err(forbidden) = authorize_mutation(identity.subject_id, resource.owner_id()) {
        warn!(
            "Subject {} attempted to modify a resource owned by {}",
            identity.subject_id,
            resource.owner_id()
        );
        return Err(forbidden.into());
    }

    Ok(resource)
}
