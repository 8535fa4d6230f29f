//! Authorization guard - per-action permission checks.
//!
//! Refusals come in two kinds that must stay distinct: a silent redirect
//! (post creation by non-staff) and a hard denial (everything else).

use crate::domain::{POST_LIST_URL, Post};
use crate::error::DomainError;
use crate::ports::{Identity, Requester};

/// Result of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'a> {
    /// The action may proceed on behalf of this identity.
    Allow(&'a Identity),
    /// The action is refused by sending the requester elsewhere.
    Redirect(&'static str),
    /// The action is refused outright.
    Deny,
}

impl<'a> Decision<'a> {
    /// Collapse a hard-deny check into a `Result`.
    ///
    /// Only for checks that never redirect; a redirect here is a bug.
    pub fn require(self) -> Result<&'a Identity, DomainError> {
        match self {
            Decision::Allow(identity) => Ok(identity),
            Decision::Redirect(location) => {
                tracing::error!(location, "Redirect decision where a denial was expected");
                Err(DomainError::PermissionDenied)
            }
            Decision::Deny => Err(DomainError::PermissionDenied),
        }
    }
}

/// Staff and superusers may write posts; everyone else goes back to the list.
pub fn create_post(requester: &Requester) -> Decision<'_> {
    match requester.identity() {
        Some(identity) if identity.is_staff || identity.is_superuser => Decision::Allow(identity),
        _ => Decision::Redirect(POST_LIST_URL),
    }
}

/// Only the post's own author may edit it.
pub fn update_post<'a>(requester: &'a Requester, post: &Post) -> Decision<'a> {
    match requester.identity() {
        Some(identity) if post.author_id == Some(identity.user_id) => Decision::Allow(identity),
        _ => Decision::Deny,
    }
}

/// Any authenticated user may comment.
pub fn create_comment(requester: &Requester) -> Decision<'_> {
    match requester.identity() {
        Some(identity) => Decision::Allow(identity),
        None => Decision::Deny,
    }
}

/// Categories and tags are curated by staff and superusers.
pub fn manage_catalog(requester: &Requester) -> Decision<'_> {
    match requester.identity() {
        Some(identity) if identity.is_staff || identity.is_superuser => Decision::Allow(identity),
        _ => Decision::Deny,
    }
}
