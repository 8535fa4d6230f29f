//! Services - the blog's use cases, written against the ports.

pub mod catalog;
pub mod comments;
pub mod guard;
pub mod posts;
pub mod query;
pub mod tags;

pub use comments::{CommentOutcome, CommentRequest, submit_comment};
pub use guard::Decision;
pub use posts::{Outcome, SavedPost, create_post, update_post};
pub use tags::{apply_tags, parse_tags, resolve_tags, split_tag_names};
