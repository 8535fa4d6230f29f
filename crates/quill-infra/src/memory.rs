//! In-memory content store - used when no database is configured, and by tests.
//!
//! Mirrors the relational rules of the PostgreSQL schema: unique names and
//! slugs, foreign keys, and the cascade or set-null behaviour on delete.
//! Data is lost on process restart.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{
    Category, CategoryCount, Comment, NewCategory, NewComment, NewPost, NewTag, Post, PostInput,
    Tag, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, ContentStore, PostRepository,
    TagRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    posts: BTreeMap<i32, Post>,
    categories: BTreeMap<i32, Category>,
    tags: BTreeMap<i32, Tag>,
    /// (post_id, tag_id)
    post_tags: BTreeSet<(i32, i32)>,
    comments: BTreeMap<i32, Comment>,
    users: HashMap<Uuid, User>,
    last_post_id: i32,
    last_category_id: i32,
    last_tag_id: i32,
    last_comment_id: i32,
}

impl Tables {
    fn require_user(&self, id: Uuid) -> Result<(), RepoError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(RepoError::Constraint(format!("user {id} does not exist")))
        }
    }

    fn require_category(&self, id: Option<i32>) -> Result<(), RepoError> {
        match id {
            Some(id) if !self.categories.contains_key(&id) => Err(RepoError::Constraint(format!(
                "category {id} does not exist"
            ))),
            _ => Ok(()),
        }
    }

    fn insert_tag(&mut self, tag: NewTag) -> Result<Tag, RepoError> {
        if self.tags.values().any(|t| t.name == tag.name) {
            return Err(RepoError::Constraint(format!(
                "tag name {:?} already exists",
                tag.name
            )));
        }
        if self.tags.values().any(|t| t.slug == tag.slug) {
            return Err(RepoError::Constraint(format!(
                "tag slug {:?} already exists",
                tag.slug
            )));
        }

        self.last_tag_id += 1;
        let tag = Tag {
            id: self.last_tag_id,
            name: tag.name,
            slug: tag.slug,
        };
        self.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    fn newest_first<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<Post> {
        let mut posts: Vec<Post> = posts.cloned().collect();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        posts
    }
}

/// Every repository over one set of tables behind an async RwLock.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle a fresh store as the repositories the services use.
    pub fn content_store() -> ContentStore {
        let store = Arc::new(Self::new());
        ContentStore {
            posts: store.clone(),
            categories: store.clone(),
            tags: store.clone(),
            comments: store.clone(),
            users: store,
        }
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
        tables.post_tags.retain(|&(post_id, _)| post_id != id);
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.require_user(post.author_id)?;
        tables.require_category(post.input.category_id)?;

        tables.last_post_id += 1;
        let now = Utc::now();
        let input = post.input;
        let post = Post {
            id: tables.last_post_id,
            title: input.title,
            hook_text: input.hook_text,
            content: input.content,
            head_image: input.head_image,
            file_upload: input.file_upload,
            created_at: now,
            updated_at: now,
            author_id: Some(post.author_id),
            category_id: input.category_id,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i32, input: PostInput) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.require_category(input.category_id)?;

        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.title = input.title;
        post.hook_text = input.hook_text;
        post.content = input.content;
        post.head_image = input.head_image;
        post.file_upload = input.file_upload;
        post.category_id = input.category_id;
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.posts.len() as u64)
    }

    async fn find_by_category(&self, category_id: Option<i32>) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(Tables::newest_first(
            tables
                .posts
                .values()
                .filter(|p| p.category_id == category_id),
        ))
    }

    async fn count_uncategorized(&self) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.category_id.is_none())
            .count() as u64)
    }

    async fn find_by_tag(&self, tag_id: i32) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(Tables::newest_first(
            tables
                .post_tags
                .iter()
                .filter(|&&(_, t)| t == tag_id)
                .filter_map(|(post_id, _)| tables.posts.get(post_id)),
        ))
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let needle = query.to_lowercase();

        let tagged: BTreeSet<i32> = tables
            .post_tags
            .iter()
            .filter(|(_, tag_id)| {
                tables
                    .tags
                    .get(tag_id)
                    .is_some_and(|t| t.name.to_lowercase().contains(&needle))
            })
            .map(|&(post_id, _)| post_id)
            .collect();

        Ok(Tables::newest_first(tables.posts.values().filter(|p| {
            tagged.contains(&p.id) || p.title.to_lowercase().contains(&needle)
        })))
    }

    async fn tags_for(&self, post_ids: &[i32]) -> Result<HashMap<i32, Vec<Tag>>, RepoError> {
        let tables = self.tables.read().await;
        let mut tags: HashMap<i32, Vec<Tag>> = HashMap::new();

        for &(post_id, tag_id) in &tables.post_tags {
            if !post_ids.contains(&post_id) {
                continue;
            }
            if let Some(tag) = tables.tags.get(&tag_id) {
                tags.entry(post_id).or_default().push(tag.clone());
            }
        }
        for list in tags.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(tags)
    }

    async fn replace_tags(&self, post_id: i32, tag_ids: &[i32]) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(RepoError::Constraint(format!(
                "post {post_id} does not exist"
            )));
        }
        if let Some(missing) = tag_ids.iter().find(|&&id| !tables.tags.contains_key(&id)) {
            return Err(RepoError::Constraint(format!(
                "tag {missing} does not exist"
            )));
        }

        tables.post_tags.retain(|&(p, _)| p != post_id);
        tables
            .post_tags
            .extend(tag_ids.iter().map(|&tag_id| (post_id, tag_id)));
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Category, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create(&self, category: NewCategory) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .values()
            .any(|c| c.name == category.name || c.slug == category.slug)
        {
            return Err(RepoError::Constraint(format!(
                "category {:?} already exists",
                category.name
            )));
        }

        tables.last_category_id += 1;
        let category = Category {
            id: tables.last_category_id,
            name: category.name,
            slug: category.slug,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn all(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self.tables.read().await.categories.values().cloned().collect())
    }

    async fn all_with_counts(&self) -> Result<Vec<CategoryCount>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .map(|category| CategoryCount {
                post_count: tables
                    .posts
                    .values()
                    .filter(|p| p.category_id == Some(category.id))
                    .count() as u64,
                category: category.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Tag, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.tags.remove(&id).ok_or(RepoError::NotFound)?;
        tables.post_tags.retain(|&(_, tag_id)| tag_id != id);
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn create(&self, tag: NewTag) -> Result<Tag, RepoError> {
        self.tables.write().await.insert_tag(tag)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn get_or_create(&self, tag: NewTag) -> Result<(Tag, bool), RepoError> {
        // lookup and insert share one write guard
        let mut tables = self.tables.write().await;
        let existing = tables
            .tags
            .values()
            .find(|t| t.name == tag.name)
            .or_else(|| tables.tags.values().find(|t| t.slug == tag.slug));
        if let Some(existing) = existing {
            return Ok((existing.clone(), false));
        }
        Ok((tables.insert_tag(tag)?, true))
    }
}

#[async_trait]
impl BaseRepository<Comment, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.require_user(comment.author_id)?;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }

        tables.last_comment_id += 1;
        let comment = Comment {
            id: tables.last_comment_id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.author_id == Some(id) {
                post.author_id = None;
            }
        }
        tables.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn upsert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .users
            .entry(user.id)
            .and_modify(|existing| {
                existing.username = user.username.clone();
                existing.email = user.email.clone();
                existing.is_staff = user.is_staff;
                existing.is_superuser = user.is_superuser;
            })
            .or_insert(user);
        Ok(stored.clone())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (ContentStore, User) {
        let store = InMemoryStore::content_store();
        let author = store
            .users
            .upsert(User::new(
                Uuid::new_v4(),
                "author".to_string(),
                "author@example.com".to_string(),
            ))
            .await
            .unwrap();
        (store, author)
    }

    fn draft(title: &str, author: &User, category_id: Option<i32>) -> NewPost {
        NewPost {
            input: PostInput {
                title: title.to_string(),
                content: "body".to_string(),
                category_id,
                ..Default::default()
            },
            author_id: author.id,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (store, author) = seeded().await;
        for title in ["one", "two", "three"] {
            store.posts.create(draft(title, &author, None)).await.unwrap();
        }

        let page = store.posts.list(0, 2).await.unwrap();
        let titles: Vec<_> = page.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["three", "two"]);

        let rest = store.posts.list(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].title, "one");
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_by_name() {
        let (store, _) = seeded().await;

        let (first, created) = store
            .tags
            .get_or_create(NewTag::from_name("Rust"))
            .await
            .unwrap();
        assert!(created);

        let (second, created) = store
            .tags
            .get_or_create(NewTag::from_name("Rust"))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_by_slug() {
        let (store, _) = seeded().await;

        let (first, _) = store
            .tags
            .get_or_create(NewTag::from_name("Rust"))
            .await
            .unwrap();
        let (second, created) = store
            .tags
            .get_or_create(NewTag::from_name("rust"))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second, first);
        assert_eq!(second.name, "Rust");
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_yields_one_row() {
        let (store, _) = seeded().await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tags = store.tags.clone();
                tokio::spawn(async move { tags.get_or_create(NewTag::from_name("race")).await })
            })
            .collect();

        let mut created = 0;
        let mut ids = BTreeSet::new();
        for handle in handles {
            let (tag, was_created) = handle.await.unwrap().unwrap();
            created += was_created as usize;
            ids.insert(tag.id);
        }
        assert_eq!(created, 1);
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_category_is_constraint() {
        let (store, _) = seeded().await;
        store
            .categories
            .create(NewCategory::from_name("Travel"))
            .await
            .unwrap();

        let result = store
            .categories
            .create(NewCategory::from_name("Travel"))
            .await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_deleting_category_uncategorizes_posts() {
        let (store, author) = seeded().await;
        let category = store
            .categories
            .create(NewCategory::from_name("Travel"))
            .await
            .unwrap();
        let post = store
            .posts
            .create(draft("trip", &author, Some(category.id)))
            .await
            .unwrap();

        store.categories.delete(category.id).await.unwrap();

        let post = store.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(post.category_id, None);
        assert_eq!(store.posts.count_uncategorized().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleting_post_drops_comments_and_links() {
        let (store, author) = seeded().await;
        let post = store
            .posts
            .create(draft("doomed", &author, None))
            .await
            .unwrap();
        let (tag, _) = store
            .tags
            .get_or_create(NewTag::from_name("gone"))
            .await
            .unwrap();
        store.posts.replace_tags(post.id, &[tag.id]).await.unwrap();
        store
            .comments
            .create(NewComment {
                post_id: post.id,
                author_id: author.id,
                content: "hi".to_string(),
            })
            .await
            .unwrap();

        store.posts.delete(post.id).await.unwrap();

        assert!(store.comments.find_by_post(post.id).await.unwrap().is_empty());
        assert!(store.posts.find_by_tag(tag.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_author_keeps_posts() {
        let (store, author) = seeded().await;
        let post = store
            .posts
            .create(draft("orphan", &author, None))
            .await
            .unwrap();

        store.users.delete(author.id).await.unwrap();

        let post = store.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(post.author_id, None);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let (store, author) = seeded().await;

        let result = store.posts.create(draft("lost", &author, Some(99))).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_search_matches_title_or_tag_once() {
        let (store, author) = seeded().await;
        let both = store
            .posts
            .create(draft("Rust tips", &author, None))
            .await
            .unwrap();
        store
            .posts
            .create(draft("Gardening", &author, None))
            .await
            .unwrap();
        let (tag, _) = store
            .tags
            .get_or_create(NewTag::from_name("rustacean"))
            .await
            .unwrap();
        store.posts.replace_tags(both.id, &[tag.id]).await.unwrap();

        let found = store.posts.search("RUST").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, both.id);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_flags_but_keeps_created_at() {
        let (store, author) = seeded().await;
        let mut changed = author.clone();
        changed.is_staff = true;
        changed.created_at = Utc::now() + chrono::TimeDelta::hours(1);

        let stored = store.users.upsert(changed).await.unwrap();
        assert!(stored.is_staff);
        assert_eq!(stored.created_at, author.created_at);
    }
}
