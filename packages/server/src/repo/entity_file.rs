//! Polymorphic `(entity_id, entity_type) -> file` associations.
//!
//! Association rows are hard-deleted; only their owners and files carry
//! meaningful tombstones. Reads still skip any tombstoned row so that a row
//! soft-deleted through the generic repository never resurfaces.

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, TransactionTrait,
};

use super::base::{BaseRepo, RepoError};
use super::file::FILES_TABLE;
use super::query::{FilterCondition, PageRequest, QueryOptions, apply_filters, column_ref};
use crate::entity::entity_file::{self, EntityType};
use crate::entity::file;

pub struct EntityFileRepo<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> EntityFileRepo<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn live_for(entity_id: i64, entity_type: EntityType) -> Select<entity_file::Entity> {
        entity_file::Entity::find()
            .filter(entity_file::Column::EntityId.eq(entity_id))
            .filter(entity_file::Column::EntityType.eq(entity_type))
            .filter(entity_file::Column::DeletedAt.is_null())
    }

    /// Live files linked to an owner, in association order.
    fn files_of(entity_id: i64, entity_type: EntityType) -> Select<file::Entity> {
        file::Entity::find()
            .inner_join(entity_file::Entity)
            .filter(entity_file::Column::EntityId.eq(entity_id))
            .filter(entity_file::Column::EntityType.eq(entity_type))
            .filter(entity_file::Column::DeletedAt.is_null())
            .filter(file::Column::DeletedAt.is_null())
    }

    /// Link one file. Duplicate links are not rejected.
    pub async fn associate(
        &self,
        entity_id: i64,
        entity_type: EntityType,
        file_id: i64,
    ) -> Result<entity_file::Model, RepoError> {
        BaseRepo::<C, entity_file::Entity>::new(self.conn)
            .create(entity_file::ActiveModel {
                entity_id: Set(entity_id),
                entity_type: Set(entity_type),
                file_id: Set(file_id),
                ..Default::default()
            })
            .await
    }

    /// Link several files in one statement. An empty list is a no-op.
    pub async fn batch_associate(
        &self,
        entity_id: i64,
        entity_type: EntityType,
        file_ids: &[i64],
    ) -> Result<(), RepoError> {
        if file_ids.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let rows = file_ids.iter().map(|&file_id| entity_file::ActiveModel {
            entity_id: Set(entity_id),
            entity_type: Set(entity_type),
            file_id: Set(file_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });
        entity_file::Entity::insert_many(rows)
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }

    /// Unlink a file from an owner. Returns the number of rows removed; zero
    /// is not an error.
    pub async fn remove_association(
        &self,
        entity_id: i64,
        entity_type: EntityType,
        file_id: i64,
    ) -> Result<u64, RepoError> {
        let result = entity_file::Entity::delete_many()
            .filter(entity_file::Column::EntityId.eq(entity_id))
            .filter(entity_file::Column::EntityType.eq(entity_type))
            .filter(entity_file::Column::FileId.eq(file_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Unlink every file of an owner.
    pub async fn delete_by_entity(
        &self,
        entity_id: i64,
        entity_type: EntityType,
    ) -> Result<u64, RepoError> {
        let result = entity_file::Entity::delete_many()
            .filter(entity_file::Column::EntityId.eq(entity_id))
            .filter(entity_file::Column::EntityType.eq(entity_type))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn list_by_entity(
        &self,
        entity_id: i64,
        entity_type: EntityType,
    ) -> Result<Vec<entity_file::Model>, RepoError> {
        Ok(Self::live_for(entity_id, entity_type)
            .order_by_asc(entity_file::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn associated_files(
        &self,
        entity_id: i64,
        entity_type: EntityType,
    ) -> Result<Vec<file::Model>, RepoError> {
        Ok(Self::files_of(entity_id, entity_type)
            .order_by_asc(entity_file::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Page through an owner's files. `options` narrows and orders the files;
    /// ties fall back to association order.
    pub async fn associated_files_paginated(
        &self,
        entity_id: i64,
        entity_type: EntityType,
        page: PageRequest,
        options: &QueryOptions,
    ) -> Result<(Vec<file::Model>, u64), RepoError> {
        let select = apply_filters(
            Self::files_of(entity_id, entity_type),
            FILES_TABLE,
            &options.conditions,
        );
        let total = select.clone().count(self.conn).await?;

        let select = match &options.order {
            Some((field, order)) => select
                .order_by(column_ref(FILES_TABLE, field), order.clone())
                .order_by(entity_file::Column::Id, order.clone()),
            None => select.order_by_asc(entity_file::Column::Id),
        };
        let files = select
            .offset(page.offset())
            .limit(page.size())
            .all(self.conn)
            .await?;
        Ok((files, total))
    }

    /// Owners of `entity_type` that link `file_id`.
    pub async fn associated_entities(
        &self,
        file_id: i64,
        entity_type: EntityType,
    ) -> Result<Vec<i64>, RepoError> {
        Ok(entity_file::Entity::find()
            .select_only()
            .column(entity_file::Column::EntityId)
            .filter(entity_file::Column::FileId.eq(file_id))
            .filter(entity_file::Column::EntityType.eq(entity_type))
            .filter(entity_file::Column::DeletedAt.is_null())
            .order_by_asc(entity_file::Column::Id)
            .into_tuple::<i64>()
            .all(self.conn)
            .await?)
    }

    /// True when any live association of any type references the file.
    pub async fn check_file_used(&self, file_id: i64) -> Result<bool, RepoError> {
        let count = entity_file::Entity::find()
            .filter(entity_file::Column::FileId.eq(file_id))
            .filter(entity_file::Column::DeletedAt.is_null())
            .count(self.conn)
            .await?;
        Ok(count > 0)
    }

    /// Batch loader behind the file preloads: `(owner id, file)` pairs for
    /// every owner in `entity_ids`, in association order.
    pub async fn files_for_entities(
        &self,
        entity_type: EntityType,
        entity_ids: &[i64],
        conditions: &[FilterCondition],
    ) -> Result<Vec<(i64, file::Model)>, RepoError> {
        if entity_ids.is_empty() {
            return Ok(Vec::new());
        }
        let select = entity_file::Entity::find()
            .find_also_related(file::Entity)
            .filter(entity_file::Column::EntityType.eq(entity_type))
            .filter(entity_file::Column::EntityId.is_in(entity_ids.iter().copied()))
            .filter(entity_file::Column::DeletedAt.is_null())
            .filter(file::Column::DeletedAt.is_null());
        let rows = apply_filters(select, FILES_TABLE, conditions)
            .order_by_asc(entity_file::Column::Id)
            .all(self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(link, file)| file.map(|file| (link.entity_id, file)))
            .collect())
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> EntityFileRepo<'a, C> {
    /// Replace an owner's file set atomically.
    pub async fn update_entity_files(
        &self,
        entity_id: i64,
        entity_type: EntityType,
        file_ids: &[i64],
    ) -> Result<(), RepoError> {
        let txn = self.conn.begin().await?;
        let repo = EntityFileRepo::new(&txn);
        repo.delete_by_entity(entity_id, entity_type).await?;
        repo.batch_associate(entity_id, entity_type, file_ids).await?;
        txn.commit().await?;
        Ok(())
    }
}
