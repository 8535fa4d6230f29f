use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryCount, Comment, NewCategory, NewComment, NewPost, NewTag, Post, PostInput,
    Tag, User,
};
use crate::error::RepoError;

/// Generic repository trait defining the lookups every table supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID, applying the table's cascade rules.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Insert a post; identifier and timestamps are assigned by the store.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite the editable fields of a post and refresh `updated_at`.
    async fn update(&self, id: i32, input: PostInput) -> Result<Post, RepoError>;

    /// Posts ordered by descending identifier, `limit` rows starting at `offset`.
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Total number of posts.
    async fn count(&self) -> Result<u64, RepoError>;

    /// Posts filed under `category_id` (`None` selects uncategorized posts),
    /// ordered by descending identifier.
    async fn find_by_category(&self, category_id: Option<i32>) -> Result<Vec<Post>, RepoError>;

    /// Number of posts with no category.
    async fn count_uncategorized(&self) -> Result<u64, RepoError>;

    /// Posts carrying the tag, ordered by descending identifier.
    async fn find_by_tag(&self, tag_id: i32) -> Result<Vec<Post>, RepoError>;

    /// Posts whose title or any tag name contains `query`, ignoring case.
    /// Each post appears once; ordered by descending identifier.
    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError>;

    /// Tags of each requested post. Posts without tags may be absent from the map.
    async fn tags_for(&self, post_ids: &[i32]) -> Result<HashMap<i32, Vec<Tag>>, RepoError>;

    /// Replace the post's tag associations with exactly `tag_ids`.
    async fn replace_tags(&self, post_id: i32, tag_ids: &[i32]) -> Result<(), RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, i32> {
    async fn create(&self, category: NewCategory) -> Result<Category, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Every category in identifier order.
    async fn all(&self) -> Result<Vec<Category>, RepoError>;

    /// Every category with the number of posts filed under it.
    async fn all_with_counts(&self) -> Result<Vec<CategoryCount>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, i32> {
    async fn create(&self, tag: NewTag) -> Result<Tag, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    /// Fetch the tag named `tag.name`, or else the one already holding
    /// `tag.slug`, inserting the draft when neither exists.
    ///
    /// Must be atomic: concurrent callers with the same name or slug observe
    /// one row. Returns the tag and whether this call created it.
    async fn get_or_create(&self, tag: NewTag) -> Result<(Tag, bool), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i32> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments on a post in creation order.
    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Comment>, RepoError>;
}

/// User repository - the local mirror of identity-provider accounts.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Insert the user, or refresh name, email and flags of an existing row.
    async fn upsert(&self, user: User) -> Result<User, RepoError>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Every repository the blog needs, bundled for the services.
#[derive(Clone)]
pub struct ContentStore {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub users: Arc<dyn UserRepository>,
}
