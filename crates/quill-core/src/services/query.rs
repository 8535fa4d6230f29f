//! Query layer - the read-only views over posts.
//!
//! Each function returns the context object handed to the presentation
//! layer; the shape of these structs is the contract with it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    AuthorSummary, Category, CategoryCount, Comment, Pagination, Post, Tag, User,
};
use crate::error::DomainError;
use crate::ports::ContentStore;

/// Posts per page of the main list.
pub const POSTS_PER_PAGE: u64 = 5;

/// Posts shown on the landing page.
pub const RECENT_POSTS: u64 = 3;

/// Pseudo-slug selecting posts without a category.
pub const NO_CATEGORY_SLUG: &str = "no_category";

/// Display name of the pseudo-category.
pub const NO_CATEGORY_NAME: &str = "Uncategorized";

/// Category list and uncategorized count shown next to every post view.
#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
    pub categories: Vec<CategoryCount>,
    pub no_category_post_count: u64,
}

/// A post as it appears in listings.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub hook_text: String,
    pub head_image: Option<String>,
    pub file_upload: Option<String>,
    pub file_name: Option<String>,
    pub file_ext: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub author: Option<AuthorSummary>,
}

impl PostSummary {
    fn build(
        post: &Post,
        category: Option<Category>,
        tags: Vec<Tag>,
        author: Option<AuthorSummary>,
    ) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            hook_text: post.hook_text.clone(),
            head_image: post.head_image.clone(),
            file_upload: post.file_upload.clone(),
            file_name: post.file_name().map(str::to_string),
            file_ext: post.file_ext().map(str::to_string),
            created_at: post.created_at,
            updated_at: post.updated_at,
            url: post.absolute_url(),
            category,
            tags,
            author,
        }
    }
}

/// Which category a filtered list was narrowed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFilter {
    pub name: String,
    pub slug: String,
}

/// Context of every post-list style view.
#[derive(Debug, Clone, Serialize)]
pub struct PostListContext {
    pub post_list: Vec<PostSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(flatten)]
    pub sidebar: Sidebar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_info: Option<String>,
}

impl PostListContext {
    fn new(post_list: Vec<PostSummary>, sidebar: Sidebar) -> Self {
        Self {
            post_list,
            pagination: None,
            sidebar,
            category: None,
            tag: None,
            search_info: None,
        }
    }
}

/// A comment as shown under its post.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub author: Option<AuthorSummary>,
}

/// Description of the empty comment form on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentFormSpec {
    pub action: String,
    pub fields: Vec<&'static str>,
}

impl CommentFormSpec {
    pub fn for_post(post_id: i32) -> Self {
        Self {
            action: format!("/blog/{post_id}/new_comment/"),
            fields: vec!["content"],
        }
    }
}

/// Full post as shown on its detail page.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub label: String,
    pub content: String,
    pub content_html: String,
}

/// Context of the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailContext {
    pub post: PostDetail,
    pub comments: Vec<CommentView>,
    #[serde(flatten)]
    pub sidebar: Sidebar,
    pub comment_form: CommentFormSpec,
}

/// Context of the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct LandingContext {
    pub recent_posts: Vec<PostSummary>,
}

/// Category counts plus the number of uncategorized posts.
pub async fn sidebar(store: &ContentStore) -> Result<Sidebar, DomainError> {
    Ok(Sidebar {
        categories: store.categories.all_with_counts().await?,
        no_category_post_count: store.posts.count_uncategorized().await?,
    })
}

async fn authors_by_id(
    store: &ContentStore,
    ids: impl Iterator<Item = Uuid>,
) -> Result<HashMap<Uuid, User>, DomainError> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = store.users.find_many(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Resolve tags, categories and authors of `posts` with one lookup each.
pub async fn summarize(
    store: &ContentStore,
    posts: &[Post],
) -> Result<Vec<PostSummary>, DomainError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
    let mut tags = store.posts.tags_for(&ids).await?;
    let categories: HashMap<i32, Category> = store
        .categories
        .all()
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let authors = authors_by_id(store, posts.iter().filter_map(|p| p.author_id)).await?;

    Ok(posts
        .iter()
        .map(|post| {
            let category = post.category_id.and_then(|id| categories.get(&id).cloned());
            let author = post
                .author_id
                .and_then(|id| authors.get(&id))
                .map(AuthorSummary::from);
            let post_tags = tags.remove(&post.id).unwrap_or_default();
            PostSummary::build(post, category, post_tags, author)
        })
        .collect())
}

/// Newest posts first, [`POSTS_PER_PAGE`] at a time. `page` defaults to 1.
pub async fn list_posts(
    store: &ContentStore,
    page: Option<u64>,
) -> Result<PostListContext, DomainError> {
    let number = page.unwrap_or(1);
    let total = store.posts.count().await?;
    let pagination = Pagination::locate(number, total, POSTS_PER_PAGE)
        .ok_or_else(|| DomainError::not_found("Page", number))?;

    let posts = store
        .posts
        .list(pagination.offset(), POSTS_PER_PAGE)
        .await?;

    let mut context = PostListContext::new(summarize(store, &posts).await?, sidebar(store).await?);
    context.pagination = Some(pagination);
    Ok(context)
}

/// One post with its comments.
pub async fn post_detail(store: &ContentStore, id: i32) -> Result<PostDetailContext, DomainError> {
    let post = store
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", id))?;

    let summary = summarize(store, std::slice::from_ref(&post))
        .await?
        .pop()
        .ok_or_else(|| DomainError::Internal("post summary missing".to_string()))?;

    let comments = store.comments.find_by_post(id).await?;
    let commenters = authors_by_id(store, comments.iter().map(|c| c.author_id)).await?;
    let comments = comments
        .iter()
        .map(|comment| comment_view(comment, &commenters))
        .collect();

    let label = post.label(summary.author.as_ref().map(|a| a.username.as_str()));
    let content_html = post.content_html();

    Ok(PostDetailContext {
        post: PostDetail {
            summary,
            label,
            content: post.content,
            content_html,
        },
        comments,
        sidebar: sidebar(store).await?,
        comment_form: CommentFormSpec::for_post(id),
    })
}

fn comment_view(comment: &Comment, authors: &HashMap<Uuid, User>) -> CommentView {
    CommentView {
        id: comment.id,
        content: comment.content.clone(),
        created_at: comment.created_at,
        url: comment.absolute_url(),
        author: authors.get(&comment.author_id).map(AuthorSummary::from),
    }
}

/// Posts in one category; [`NO_CATEGORY_SLUG`] selects uncategorized posts.
pub async fn category_posts(
    store: &ContentStore,
    slug: &str,
) -> Result<PostListContext, DomainError> {
    let (filter, category_id) = if slug == NO_CATEGORY_SLUG {
        let filter = CategoryFilter {
            name: NO_CATEGORY_NAME.to_string(),
            slug: NO_CATEGORY_SLUG.to_string(),
        };
        (filter, None)
    } else {
        let category = store
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", slug))?;
        let filter = CategoryFilter {
            name: category.name,
            slug: category.slug,
        };
        (filter, Some(category.id))
    };

    let posts = store.posts.find_by_category(category_id).await?;
    let mut context = PostListContext::new(summarize(store, &posts).await?, sidebar(store).await?);
    context.category = Some(filter);
    Ok(context)
}

/// Posts carrying one tag.
pub async fn tag_posts(store: &ContentStore, slug: &str) -> Result<PostListContext, DomainError> {
    let tag = store
        .tags
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Tag", slug))?;

    let posts = store.posts.find_by_tag(tag.id).await?;
    let mut context = PostListContext::new(summarize(store, &posts).await?, sidebar(store).await?);
    context.tag = Some(tag);
    Ok(context)
}

/// Posts whose title or tags mention `q`, ignoring case. Not paginated.
pub async fn search_posts(store: &ContentStore, q: &str) -> Result<PostListContext, DomainError> {
    let posts = store.posts.search(q).await?;
    tracing::debug!(query = %q, hits = posts.len(), "Searched posts");

    let mut context = PostListContext::new(summarize(store, &posts).await?, sidebar(store).await?);
    context.search_info = Some(format!("Search : {q}({})", posts.len()));
    Ok(context)
}

/// The [`RECENT_POSTS`] newest posts.
pub async fn landing(store: &ContentStore) -> Result<LandingContext, DomainError> {
    let posts = store.posts.list(0, RECENT_POSTS).await?;
    Ok(LandingContext {
        recent_posts: summarize(store, &posts).await?,
    })
}
