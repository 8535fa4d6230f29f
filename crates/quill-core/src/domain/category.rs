use serde::{Deserialize, Serialize};

use super::slug::slugify;

/// Category entity - a single-valued grouping for posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl Category {
    pub fn absolute_url(&self) -> String {
        format!("/blog/category/{}/", self.slug)
    }
}

/// A category that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

impl NewCategory {
    /// Build a category whose slug is derived from its name.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug }
    }
}

/// A category together with the number of posts filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(flatten)]
    pub category: Category,
    pub post_count: u64,
}
