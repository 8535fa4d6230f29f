//! Catalog administration - curating categories and tags directly.

use crate::domain::{Category, NewCategory, NewTag, Tag, slugify};
use crate::error::DomainError;
use crate::ports::{ContentStore, Requester};
use crate::services::guard;

const NAME_MAX_CHARS: usize = 50;
const SLUG_MAX_CHARS: usize = 200;

fn check_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::invalid("name", "This field is required."));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(DomainError::invalid(
            "name",
            "Ensure this value has at most 50 characters.",
        ));
    }
    Ok(name.to_string())
}

fn check_slug(slug: String) -> Result<String, DomainError> {
    if slug.is_empty() {
        return Err(DomainError::invalid(
            "slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        ));
    }
    if slug.chars().count() > SLUG_MAX_CHARS {
        return Err(DomainError::invalid(
            "slug",
            "Ensure this value has at most 200 characters.",
        ));
    }
    Ok(slug)
}

/// Create a category; its slug is derived from the name.
pub async fn create_category(
    store: &ContentStore,
    requester: &Requester,
    name: &str,
) -> Result<Category, DomainError> {
    guard::manage_catalog(requester).require()?;

    let draft = NewCategory::from_name(check_name(name)?);
    let draft = NewCategory {
        slug: check_slug(draft.slug)?,
        ..draft
    };
    let category = store.categories.create(draft).await?;

    tracing::info!(category_id = category.id, slug = %category.slug, "Created category");
    Ok(category)
}

/// Create a tag, deriving the slug from the name unless one is given.
pub async fn create_tag(
    store: &ContentStore,
    requester: &Requester,
    name: &str,
    slug: Option<&str>,
) -> Result<Tag, DomainError> {
    guard::manage_catalog(requester).require()?;

    let name = check_name(name)?;
    let slug = match slug {
        Some(slug) => slugify(slug),
        None => slugify(&name),
    };
    let tag = store
        .tags
        .create(NewTag {
            name,
            slug: check_slug(slug)?,
        })
        .await?;

    tracing::info!(tag_id = tag.id, slug = %tag.slug, "Created tag");
    Ok(tag)
}
