use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Base path every post URL hangs off.
pub const POST_LIST_URL: &str = "/blog/";

/// Post entity - a markdown blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    /// Short teaser shown in listings; empty when not provided.
    pub hook_text: String,
    pub content: String,
    pub head_image: Option<String>,
    pub file_upload: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<i32>,
}

impl Post {
    pub fn absolute_url(&self) -> String {
        post_url(self.id)
    }

    /// Final path segment of the attached file, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.file_upload.as_deref().map(file_name)
    }

    /// Extension of the attached file, if any.
    pub fn file_ext(&self) -> Option<&str> {
        self.file_name().map(file_ext)
    }

    /// Content rendered from markdown to HTML.
    pub fn content_html(&self) -> String {
        comrak::markdown_to_html(&self.content, &comrak::Options::default())
    }

    /// Human-readable label, e.g. `[3]Trip :: alice`.
    pub fn label(&self, author: Option<&str>) -> String {
        format!("[{}]{} :: {}", self.id, self.title, author.unwrap_or("-"))
    }
}

/// Detail URL for a post identifier.
pub fn post_url(id: i32) -> String {
    format!("{POST_LIST_URL}{id}/")
}

/// Final path segment of a stored file reference.
pub fn file_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Text after the last `.` of a file name; the whole name when it has none.
pub fn file_ext(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Editable fields of a post, as submitted through the create and update forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct PostInput {
    #[validate(length(
        min = 1,
        max = 30,
        message = "Ensure this value has between 1 and 30 characters."
    ))]
    pub title: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub hook_text: String,
    #[validate(custom(function = "crate::domain::not_blank"))]
    pub content: String,
    pub head_image: Option<String>,
    pub file_upload: Option<String>,
    pub category_id: Option<i32>,
}

/// A post that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub input: PostInput,
    pub author_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(file_upload: Option<&str>) -> Post {
        let now = Utc::now();
        Post {
            id: 7,
            title: "Trip".to_string(),
            hook_text: String::new(),
            content: "# Day one\n\nWe *walked*.".to_string(),
            head_image: None,
            file_upload: file_upload.map(str::to_string),
            created_at: now,
            updated_at: now,
            author_id: None,
            category_id: None,
        }
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(sample(None).absolute_url(), "/blog/7/");
    }

    #[test]
    fn test_file_name_and_ext() {
        let post = sample(Some("blog/files/2026/10/16/report.final.pdf"));
        assert_eq!(post.file_name(), Some("report.final.pdf"));
        assert_eq!(post.file_ext(), Some("pdf"));

        let bare = sample(Some("blog/files/README"));
        assert_eq!(bare.file_ext(), Some("README"));

        assert_eq!(sample(None).file_name(), None);
    }

    #[test]
    fn test_content_html() {
        let html = sample(None).content_html();
        assert!(html.contains("<h1>Day one</h1>"));
        assert!(html.contains("<em>walked</em>"));
    }

    #[test]
    fn test_label() {
        assert_eq!(sample(None).label(Some("alice")), "[7]Trip :: alice");
        assert_eq!(sample(None).label(None), "[7]Trip :: -");
    }

    #[test]
    fn test_input_validation() {
        let input = PostInput {
            title: "x".repeat(31),
            hook_text: String::new(),
            content: "   ".to_string(),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("content"));
        assert!(!fields.contains_key("hook_text"));
    }
}
