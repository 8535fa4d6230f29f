//! Post create and update flows.

use serde::Serialize;
use validator::Validate;

use crate::domain::{Category, NewPost, Post, PostInput, Tag};
use crate::error::DomainError;
use crate::ports::{ContentStore, Identity, Requester};
use crate::services::guard::{self, Decision};
use crate::services::tags::{apply_tags, join_tag_names, parse_tags, resolve_tags};

/// Either the requested result, or a redirect issued instead of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Redirect(String),
}

/// A post after a successful write, with the tags it now carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPost {
    pub post: Post,
    pub tags: Vec<Tag>,
}

impl SavedPost {
    /// Where the client goes after the write.
    pub fn location(&self) -> String {
        self.post.absolute_url()
    }
}

/// Context of the empty create form.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFormContext {
    pub categories: Vec<Category>,
}

/// Context of the update form, pre-filled from the stored post.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateFormContext {
    pub post: Post,
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_str_default: Option<String>,
}

/// Surrounding whitespace never counts towards a text field.
fn normalize(mut input: PostInput) -> PostInput {
    input.title = input.title.trim().to_string();
    input.hook_text = input.hook_text.trim().to_string();
    input
}

async fn clean(store: &ContentStore, input: PostInput) -> Result<PostInput, DomainError> {
    let input = normalize(input);
    input.validate()?;
    if let Some(category_id) = input.category_id {
        if store.categories.find_by_id(category_id).await?.is_none() {
            return Err(DomainError::invalid(
                "category_id",
                "Select a valid choice. That choice is not one of the available choices.",
            ));
        }
    }
    Ok(input)
}

/// Make sure the local user mirror exists before a row references it.
async fn sync_author(store: &ContentStore, identity: &Identity) -> Result<(), DomainError> {
    store.users.upsert(identity.to_user()).await?;
    Ok(())
}

async fn find_post(store: &ContentStore, id: i32) -> Result<Post, DomainError> {
    store
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", id))
}

/// The create form; non-staff requesters are sent back to the list.
pub async fn create_form(
    store: &ContentStore,
    requester: &Requester,
) -> Result<Outcome<CreateFormContext>, DomainError> {
    match guard::create_post(requester) {
        Decision::Allow(_) => Ok(Outcome::Done(CreateFormContext {
            categories: store.categories.all().await?,
        })),
        Decision::Redirect(location) => Ok(Outcome::Redirect(location.to_string())),
        Decision::Deny => Err(DomainError::PermissionDenied),
    }
}

/// Publish a new post authored by the requester.
///
/// Requesters who are neither staff nor superuser get a redirect to the post
/// list and nothing is stored.
pub async fn create_post(
    store: &ContentStore,
    requester: &Requester,
    input: PostInput,
    tags_str: Option<&str>,
) -> Result<Outcome<SavedPost>, DomainError> {
    let identity = match guard::create_post(requester) {
        Decision::Allow(identity) => identity,
        Decision::Redirect(location) => {
            tracing::debug!(location, "Post creation refused");
            return Ok(Outcome::Redirect(location.to_string()));
        }
        Decision::Deny => return Err(DomainError::PermissionDenied),
    };

    let input = clean(store, input).await?;
    let drafts = parse_tags(tags_str)?;
    sync_author(store, identity).await?;
    let tags = resolve_tags(store.tags.as_ref(), drafts).await?;

    let post = store
        .posts
        .create(NewPost {
            input,
            author_id: identity.user_id,
        })
        .await?;
    apply_tags(store, post.id, &tags).await?;

    tracing::info!(post_id = post.id, author = %identity.user_id, "Created post");
    Ok(Outcome::Done(SavedPost { post, tags }))
}

/// The update form, with the current tags joined into `tag_str_default`.
pub async fn update_form(
    store: &ContentStore,
    requester: &Requester,
    post_id: i32,
) -> Result<UpdateFormContext, DomainError> {
    let post = find_post(store, post_id).await?;
    guard::update_post(requester, &post).require()?;

    let tags = store
        .posts
        .tags_for(&[post_id])
        .await?
        .remove(&post_id)
        .unwrap_or_default();

    Ok(UpdateFormContext {
        post,
        categories: store.categories.all().await?,
        tag_str_default: join_tag_names(&tags),
    })
}

/// Edit a post. Only its author may do so.
///
/// The tag set is replaced by whatever `tags_str` names; an absent string
/// leaves the post untagged. Tags are checked and resolved before the post
/// row is written, so a rejected tag list leaves the post as it was.
pub async fn update_post(
    store: &ContentStore,
    requester: &Requester,
    post_id: i32,
    input: PostInput,
    tags_str: Option<&str>,
) -> Result<SavedPost, DomainError> {
    let post = find_post(store, post_id).await?;
    let identity = guard::update_post(requester, &post).require()?;

    let input = clean(store, input).await?;
    let drafts = parse_tags(tags_str)?;
    let tags = resolve_tags(store.tags.as_ref(), drafts).await?;

    let post = store.posts.update(post_id, input).await?;
    apply_tags(store, post.id, &tags).await?;

    tracing::info!(post_id = post.id, author = %identity.user_id, "Updated post");
    Ok(SavedPost { post, tags })
}
