use serde::{Deserialize, Serialize};

use super::slug::slugify;

/// Tag entity - a free-form label attached to any number of posts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn absolute_url(&self) -> String {
        format!("/blog/tag/{}/", self.slug)
    }
}

/// A tag that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub slug: String,
}

impl NewTag {
    /// Build a tag whose slug is derived from its name.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug }
    }
}
