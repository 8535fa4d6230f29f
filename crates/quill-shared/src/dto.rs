//! Data Transfer Objects - request payloads of the blog endpoints.

use serde::{Deserialize, Serialize};

/// `?page=N` on the post list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

/// Body of the create and update post forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFormRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hook_text: String,
    #[serde(default)]
    pub content: String,
    pub head_image: Option<String>,
    pub file_upload: Option<String>,
    /// Identifier of the category the post is filed under.
    pub category: Option<i32>,
    /// Free-text tag list, items separated by `;` or `,`.
    pub tags_str: Option<String>,
}

/// Body of the comment form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentFormRequest {
    #[serde(default)]
    pub content: String,
}

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// Request to create a tag; the slug is derived from the name when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRequest {
    pub name: String,
    pub slug: Option<String>,
}
