//! Post entity for SeaORM.

use chrono::Utc;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::{NewPost, PostInput};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(30))")]
    pub title: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub hook_text: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub head_image: Option<String>,
    pub file_upload: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub author_id: Option<Uuid>,
    pub category_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTag,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_tag::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            hook_text: model.hook_text,
            content: model.content,
            head_image: model.head_image,
            file_upload: model.file_upload,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            author_id: model.author_id,
            category_id: model.category_id,
        }
    }
}

/// Editable columns of an existing row; identifier, author and `created_at` stay untouched.
pub fn changes(id: i32, input: PostInput) -> ActiveModel {
    ActiveModel {
        id: Set(id),
        title: Set(input.title),
        hook_text: Set(input.hook_text),
        content: Set(input.content),
        head_image: Set(input.head_image),
        file_upload: Set(input.file_upload),
        updated_at: Set(Utc::now().into()),
        category_id: Set(input.category_id),
        ..Default::default()
    }
}

/// Conversion from a new Domain Post to SeaORM ActiveModel.
impl From<NewPost> for ActiveModel {
    fn from(post: NewPost) -> Self {
        let now = Utc::now();
        let input = post.input;
        Self {
            title: Set(input.title),
            hook_text: Set(input.hook_text),
            content: Set(input.content),
            head_image: Set(input.head_image),
            file_upload: Set(input.file_upload),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            author_id: Set(Some(post.author_id)),
            category_id: Set(input.category_id),
            ..Default::default()
        }
    }
}
