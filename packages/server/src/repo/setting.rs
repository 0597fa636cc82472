use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use super::base::{BaseRepo, RepoError};
use crate::entity::setting;

pub type SettingRepo<'a, C> = BaseRepo<'a, C, setting::Entity>;

/// Fields written by [`SettingRepo::upsert`].
#[derive(Debug, Clone)]
pub struct SettingInput {
    pub key: String,
    pub value: String,
    pub kind: String,
    pub label: String,
    pub group: String,
}

impl<'a, C: ConnectionTrait> BaseRepo<'a, C, setting::Entity> {
    pub async fn find_by_key(&self, key: &str) -> Result<Option<setting::Model>, RepoError> {
        Ok(setting::Entity::find()
            .filter(setting::Column::Key.eq(key))
            .filter(setting::Column::DeletedAt.is_null())
            .one(self.conn())
            .await?)
    }

    pub async fn list_by_group(&self, group: &str) -> Result<Vec<setting::Model>, RepoError> {
        Ok(setting::Entity::find()
            .filter(setting::Column::Group.eq(group))
            .filter(setting::Column::DeletedAt.is_null())
            .order_by_asc(setting::Column::Id)
            .all(self.conn())
            .await?)
    }

    /// Update the setting stored under `input.key`, or create it. A
    /// soft-deleted row with the same key is revived, since keys are unique
    /// across tombstones too.
    pub async fn upsert(&self, input: SettingInput) -> Result<setting::Model, RepoError> {
        let existing = setting::Entity::find()
            .filter(setting::Column::Key.eq(&input.key))
            .one(self.conn())
            .await?;

        match existing {
            Some(mut row) => {
                if row.deleted_at.is_some() {
                    setting::Entity::update_many()
                        .col_expr(
                            setting::Column::DeletedAt,
                            sea_orm::sea_query::Expr::value(Option::<chrono::DateTime<chrono::Utc>>::None),
                        )
                        .filter(setting::Column::Id.eq(row.id))
                        .exec(self.conn())
                        .await?;
                }
                row.value = input.value;
                row.kind = input.kind;
                row.label = input.label;
                row.group = input.group;
                row.deleted_at = None;
                self.update(row).await
            }
            None => {
                self.create(setting::ActiveModel {
                    key: Set(input.key),
                    value: Set(input.value),
                    kind: Set(input.kind),
                    label: Set(input.label),
                    group: Set(input.group),
                    remark: Set(String::new()),
                    ..Default::default()
                })
                .await
            }
        }
    }
}
