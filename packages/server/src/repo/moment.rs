use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};

use super::base::{BaseRepo, Eager, RepoError};
use super::entity_file::EntityFileRepo;
use super::query::{FilterCondition, Preload, QueryOptions};
use super::user::{UserLink, UserRepo, UserWithAvatar};
use crate::entity::entity_file::EntityType;
use crate::entity::{file, moment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentLink {
    Images,
    /// The posting user together with their avatar.
    Author,
}

#[derive(Debug, Clone)]
pub struct MomentWithRelations {
    pub moment: moment::Model,
    pub images: Vec<file::Model>,
    pub author: Option<UserWithAvatar>,
}

impl From<moment::Model> for MomentWithRelations {
    fn from(moment: moment::Model) -> Self {
        Self {
            moment,
            images: Vec::new(),
            author: None,
        }
    }
}

#[async_trait]
impl Eager for moment::Entity {
    type Link = MomentLink;
    type Loaded = MomentWithRelations;

    async fn preload<C: ConnectionTrait>(
        conn: &C,
        rows: &mut [MomentWithRelations],
        preload: &Preload<MomentLink>,
    ) -> Result<(), RepoError> {
        match preload.link {
            MomentLink::Images => {
                let ids: Vec<i64> = rows.iter().map(|r| r.moment.id).collect();
                let mut by_moment: HashMap<i64, Vec<file::Model>> = HashMap::new();
                for (moment_id, file) in EntityFileRepo::new(conn)
                    .files_for_entities(EntityType::Moment, &ids, &preload.conditions)
                    .await?
                {
                    by_moment.entry(moment_id).or_default().push(file);
                }
                for row in rows.iter_mut() {
                    row.images = by_moment.remove(&row.moment.id).unwrap_or_default();
                }
            }
            MomentLink::Author => {
                let ids: Vec<i64> = rows.iter().map(|r| r.moment.user_id).collect();
                let options = QueryOptions::new()
                    .filter(FilterCondition::is_in("id", ids))
                    .filters(preload.conditions.iter().cloned())
                    .preload(UserLink::Avatar);
                let users: HashMap<i64, UserWithAvatar> = UserRepo::new(conn)
                    .list(&options)
                    .await?
                    .into_iter()
                    .map(|u| (u.user.id, u))
                    .collect();
                for row in rows.iter_mut() {
                    row.author = users.get(&row.moment.user_id).cloned();
                }
            }
        }
        Ok(())
    }
}

/// Editable moment columns. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct MomentEdit {
    pub content: Option<String>,
    pub is_public: Option<bool>,
}

pub type MomentRepo<'a, C> = BaseRepo<'a, C, moment::Entity>;

impl<'a, C: ConnectionTrait> BaseRepo<'a, C, moment::Entity> {
    /// Atomically add one like. Returns the like count after the increment.
    pub async fn increment_likes(&self, moment_id: i64) -> Result<i32, RepoError> {
        self.update_columns(
            moment_id,
            [(
                moment::Column::Likes,
                Expr::col(moment::Column::Likes).add(1),
            )],
        )
        .await?;
        let likes: Option<i32> = moment::Entity::find()
            .select_only()
            .column(moment::Column::Likes)
            .filter(moment::Column::Id.eq(moment_id))
            .into_tuple()
            .one(self.conn())
            .await?;
        likes.ok_or(RepoError::NotFound("moment"))
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> BaseRepo<'a, C, moment::Entity> {
    pub async fn create_with_images(
        &self,
        model: moment::ActiveModel,
        image_ids: &[i64],
    ) -> Result<moment::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let created = MomentRepo::new(&txn).create(model).await?;
        EntityFileRepo::new(&txn)
            .batch_associate(created.id, EntityType::Moment, image_ids)
            .await?;
        txn.commit().await?;
        Ok(created)
    }

    /// Apply `edit` as targeted column writes under a row lock; `Some(ids)`
    /// also replaces the image set. `likes` is never written here.
    pub async fn update_with_images(
        &self,
        moment_id: i64,
        edit: MomentEdit,
        image_ids: Option<&[i64]>,
    ) -> Result<moment::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let repo = MomentRepo::new(&txn);
        repo.find_by_id(moment_id, &QueryOptions::new().for_update())
            .await?;

        let mut columns = Vec::new();
        if let Some(content) = edit.content {
            columns.push((moment::Column::Content, Expr::value(content)));
        }
        if let Some(is_public) = edit.is_public {
            columns.push((moment::Column::IsPublic, Expr::value(is_public)));
        }
        repo.update_columns(moment_id, columns).await?;

        if let Some(ids) = image_ids {
            let links = EntityFileRepo::new(&txn);
            links.delete_by_entity(moment_id, EntityType::Moment).await?;
            links.batch_associate(moment_id, EntityType::Moment, ids).await?;
        }
        let updated = repo.find_by_id(moment_id, &QueryOptions::new()).await?;
        txn.commit().await?;
        Ok(updated.moment)
    }

    pub async fn delete_with_images(&self, moment_id: i64) -> Result<(), RepoError> {
        let txn = self.conn().begin().await?;
        MomentRepo::new(&txn).delete_by_id(moment_id).await?;
        EntityFileRepo::new(&txn)
            .delete_by_entity(moment_id, EntityType::Moment)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    /// Flip visibility with a targeted update under a row lock.
    pub async fn set_public(&self, moment_id: i64, is_public: bool) -> Result<(), RepoError> {
        let txn = self.conn().begin().await?;
        let repo = MomentRepo::new(&txn);
        repo.find_by_id(moment_id, &QueryOptions::new().for_update())
            .await?;
        repo.update_columns(moment_id, [(moment::Column::IsPublic, Expr::value(is_public))])
            .await?;
        txn.commit().await?;
        Ok(())
    }
}
