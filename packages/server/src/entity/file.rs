use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub original_name: String,
    /// Name of the backend holding the content (`local`, `s3`, `webdav`).
    pub storage: String,
    pub path: String,
    pub size: i64,
    pub mime_type: String,
    /// Lowercase hex SHA-256 of the content.
    #[sea_orm(indexed)]
    pub hash: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entity_file::Entity")]
    EntityFile,
}

impl Related<super::entity_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntityFile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
