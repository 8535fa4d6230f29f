//! Domain entities - the core business objects.

mod category;
mod comment;
mod pagination;
mod post;
mod slug;
mod tag;
mod user;

pub use category::{Category, CategoryCount, NewCategory};
pub use comment::{Comment, CommentInput, NewComment};
pub use pagination::Pagination;
pub use post::{NewPost, POST_LIST_URL, Post, PostInput, file_ext, file_name, post_url};
pub use slug::slugify;
pub use tag::{NewTag, Tag};
pub use user::{AuthorSummary, User};

use validator::ValidationError;

/// Rejects empty and whitespace-only text fields.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("This field is required.".into());
        return Err(error);
    }
    Ok(())
}
