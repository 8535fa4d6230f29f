//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
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

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// Wire every PostgreSQL repository onto one connection pool.
pub fn content_store(db: DbConn) -> ContentStore {
    ContentStore {
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
        tags: Arc::new(PostgresTagRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db.clone())),
        users: Arc::new(PostgresUserRepository::new(db)),
    }
}

/// Escape LIKE wildcards so user input only matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_ignore_case(column: Expr, query: &str) -> sea_orm::sea_query::SimpleExpr {
    let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
    Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern).escape('\\'))
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, input: PostInput) -> Result<Post, RepoError> {
        let model = post::changes(id, input)
            .update(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        PostEntity::find().count(&self.db).await.map_err(repo_err)
    }

    async fn find_by_category(&self, category_id: Option<i32>) -> Result<Vec<Post>, RepoError> {
        let filter = match category_id {
            Some(id) => post::Column::CategoryId.eq(id),
            None => post::Column::CategoryId.is_null(),
        };
        let result = PostEntity::find()
            .filter(filter)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_uncategorized(&self) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::CategoryId.is_null())
            .count(&self.db)
            .await
            .map_err(repo_err)
    }

    async fn find_by_tag(&self, tag_id: i32) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .join(JoinType::InnerJoin, post::Relation::PostTag.def())
            .filter(post_tag::Column::TagId.eq(tag_id))
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(query = %query, "Searching posts");

        let result = PostEntity::find()
            .distinct()
            .join(JoinType::LeftJoin, post::Relation::PostTag.def())
            .join(JoinType::LeftJoin, post_tag::Relation::Tag.def())
            .filter(
                Condition::any()
                    .add(contains_ignore_case(
                        Expr::col((PostEntity, post::Column::Title)),
                        query,
                    ))
                    .add(contains_ignore_case(
                        Expr::col((TagEntity, tag::Column::Name)),
                        query,
                    )),
            )
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn tags_for(&self, post_ids: &[i32]) -> Result<HashMap<i32, Vec<Tag>>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids.iter().copied()))
            .find_also_related(TagEntity)
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        let mut tags: HashMap<i32, Vec<Tag>> = HashMap::new();
        for (link, tag) in rows {
            if let Some(tag) = tag {
                tags.entry(link.post_id).or_default().push(tag.into());
            }
        }
        Ok(tags)
    }

    async fn replace_tags(&self, post_id: i32, tag_ids: &[i32]) -> Result<(), RepoError> {
        let mut tag_ids = tag_ids.to_vec();
        tag_ids.sort_unstable();
        tag_ids.dedup();

        let txn = self.db.begin().await.map_err(repo_err)?;

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        if !tag_ids.is_empty() {
            let links = tag_ids.into_iter().map(|tag_id| post_tag::ActiveModel {
                post_id: Set(post_id),
                tag_id: Set(tag_id),
            });
            PostTagEntity::insert_many(links)
                .on_conflict(
                    OnConflict::columns([post_tag::Column::PostId, post_tag::Column::TagId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(repo_err)?;
        }

        txn.commit().await.map_err(repo_err)
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, category: NewCategory) -> Result<Category, RepoError> {
        let model = category::ActiveModel::from(category)
            .insert(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn all_with_counts(&self) -> Result<Vec<CategoryCount>, RepoError> {
        let categories = self.all().await?;

        let counts: HashMap<i32, i64> = PostEntity::find()
            .select_only()
            .column(post::Column::CategoryId)
            .column_as(Expr::col(post::Column::Id).count(), "post_count")
            .filter(post::Column::CategoryId.is_not_null())
            .group_by(post::Column::CategoryId)
            .into_tuple::<(Option<i32>, i64)>()
            .all(&self.db)
            .await
            .map_err(repo_err)?
            .into_iter()
            .filter_map(|(id, count)| id.map(|id| (id, count)))
            .collect();

        Ok(categories
            .into_iter()
            .map(|category| CategoryCount {
                post_count: counts.get(&category.id).copied().unwrap_or(0) as u64,
                category,
            })
            .collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn create(&self, tag: NewTag) -> Result<Tag, RepoError> {
        let model = tag::ActiveModel::from(tag)
            .insert(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn get_or_create(&self, tag: NewTag) -> Result<(Tag, bool), RepoError> {
        let (name, slug) = (tag.name.clone(), tag.slug.clone());

        // no conflict target: a clash on either unique column leaves the
        // existing row in place
        let inserted = TagEntity::insert(tag::ActiveModel::from(tag))
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await
            .map_err(repo_err)?;

        let mut candidates = TagEntity::find()
            .filter(
                Condition::any()
                    .add(tag::Column::Name.eq(name.as_str()))
                    .add(tag::Column::Slug.eq(slug)),
            )
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        // a row with the same name wins over one that only shares the slug
        let index = candidates.iter().position(|t| t.name == name).unwrap_or(0);
        if index >= candidates.len() {
            return Err(RepoError::NotFound);
        }
        let model = candidates.swap_remove(index);

        Ok((model.into(), inserted > 0))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(comment)
            .insert(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn upsert(&self, user: User) -> Result<User, RepoError> {
        let id = user.id;
        tracing::debug!(user_id = %id, "Syncing user mirror");

        UserEntity::insert(user::ActiveModel::from(user))
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([
                        user::Column::Username,
                        user::Column::Email,
                        user::Column::IsStaff,
                        user::Column::IsSuperuser,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(repo_err)?;

        BaseRepository::<User, Uuid>::find_by_id(self, id)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
