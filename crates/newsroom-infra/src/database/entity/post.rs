//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

/// Post kind as stored in the `kind` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PostKind {
    #[sea_orm(string_value = "article")]
    Article,
    #[sea_orm(string_value = "news")]
    News,
}

impl From<PostKind> for newsroom_core::domain::PostKind {
    fn from(kind: PostKind) -> Self {
        match kind {
            PostKind::Article => Self::Article,
            PostKind::News => Self::News,
        }
    }
}

impl From<newsroom_core::domain::PostKind> for PostKind {
    fn from(kind: newsroom_core::domain::PostKind) -> Self {
        match kind {
            newsroom_core::domain::PostKind::Article => Self::Article,
            newsroom_core::domain::PostKind::News => Self::News,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: PostKind,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub rating: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for newsroom_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            kind: model.kind.into(),
            title: model.title,
            content: model.content,
            rating: model.rating,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<newsroom_core::domain::Post> for ActiveModel {
    fn from(post: newsroom_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            kind: Set(post.kind.into()),
            title: Set(post.title),
            content: Set(post.content),
            rating: Set(post.rating),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
