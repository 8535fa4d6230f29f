use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::post::post_url;

/// Comment entity - a reader's reply attached to one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Anchor of this comment inside its post's detail page.
    pub fn absolute_url(&self) -> String {
        format!("{}#comment-{}", post_url(self.post_id), self.id)
    }
}

/// Payload of the comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct CommentInput {
    #[validate(custom(function = "crate::domain::not_blank"))]
    pub content: String,
}

/// A comment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: i32,
    pub author_id: Uuid,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_points_at_anchor() {
        let comment = Comment {
            id: 12,
            post_id: 1,
            author_id: Uuid::new_v4(),
            content: "nice!".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(comment.absolute_url(), "/blog/1/#comment-12");
    }

    #[test]
    fn test_blank_content_is_rejected() {
        let input = CommentInput {
            content: " \n\t".to_string(),
        };
        assert!(input.validate().is_err());

        let input = CommentInput {
            content: "nice!".to_string(),
        };
        assert!(input.validate().is_ok());
    }
}
