//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;

pub use auth::{
    AuthError, Identity, ROLE_STAFF, ROLE_SUPERUSER, Requester, TokenClaims, TokenService,
};
pub use repository::{
    BaseRepository, CategoryRepository, CommentRepository, ContentStore, PostRepository,
    TagRepository, UserRepository,
};
