use std::collections::HashMap;

use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::base::{BaseRepo, RepoError};
use super::query::{FilterCondition, PageRequest, apply_filters};
use crate::entity::{entity_file, file};

pub type FileRepo<'a, C> = BaseRepo<'a, C, file::Entity>;

/// Table that bare filter fields name in file reads.
pub(crate) const FILES_TABLE: &str = "files";

impl<'a, C: ConnectionTrait> BaseRepo<'a, C, file::Entity> {
    /// Live file with the given content hash, if any.
    pub async fn find_by_hash(&self, hash: &str) -> Result<Option<file::Model>, RepoError> {
        Ok(file::Entity::find()
            .filter(file::Column::Hash.eq(hash))
            .filter(file::Column::DeletedAt.is_null())
            .order_by_asc(file::Column::Id)
            .one(self.conn())
            .await?)
    }

    /// Ids among `ids` that name live files.
    pub async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, RepoError> {
        Ok(load_by_ids(self.conn(), ids, &[]).await?.into_keys().collect())
    }

    /// Live files with no live association, oldest first.
    pub async fn find_unused(&self, page: PageRequest) -> Result<(Vec<file::Model>, u64), RepoError> {
        let used = Query::select()
            .column(entity_file::Column::FileId)
            .from(entity_file::Entity)
            .and_where(entity_file::Column::DeletedAt.is_null())
            .to_owned();
        let select = file::Entity::find()
            .filter(file::Column::DeletedAt.is_null())
            .filter(file::Column::Id.not_in_subquery(used));
        let total = select.clone().count(self.conn()).await?;
        let files = select
            .order_by_asc(file::Column::Id)
            .offset(page.offset())
            .limit(page.size())
            .all(self.conn())
            .await?;
        Ok((files, total))
    }
}

/// Live files keyed by id.
pub(crate) async fn load_by_ids<C: ConnectionTrait>(
    conn: &C,
    ids: &[i64],
    conditions: &[FilterCondition],
) -> Result<HashMap<i64, file::Model>, RepoError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let select = file::Entity::find()
        .filter(file::Column::Id.is_in(ids.iter().copied()))
        .filter(file::Column::DeletedAt.is_null());
    Ok(apply_filters(select, FILES_TABLE, conditions)
        .all(conn)
        .await?
        .into_iter()
        .map(|file| (file.id, file))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_db;
    use crate::entity::entity_file::EntityType;
    use crate::repo::EntityFileRepo;
    use crate::repo::test_support::create_file;

    #[tokio::test]
    async fn hash_lookup_skips_deleted_files() {
        let db = test_db().await;
        let repo = FileRepo::new(&db);
        let f = create_file(&db, "a.jpg").await;
        let hash = f.hash.clone().unwrap();

        assert_eq!(repo.find_by_hash(&hash).await.unwrap().unwrap().id, f.id);
        repo.delete_by_id(f.id).await.unwrap();
        assert!(repo.find_by_hash(&hash).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unused_files_are_those_without_live_links() {
        let db = test_db().await;
        let repo = FileRepo::new(&db);
        let links = EntityFileRepo::new(&db);
        let linked = create_file(&db, "linked.jpg").await;
        let orphan = create_file(&db, "orphan.jpg").await;
        let unlinked = create_file(&db, "unlinked.jpg").await;
        links.associate(1, EntityType::Album, linked.id).await.unwrap();
        links.associate(1, EntityType::Album, unlinked.id).await.unwrap();
        links.remove_association(1, EntityType::Album, unlinked.id).await.unwrap();

        let (files, total) = repo.find_unused(PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(
            files.iter().map(|f| f.id).collect::<Vec<_>>(),
            [orphan.id, unlinked.id]
        );
    }

    #[tokio::test]
    async fn existing_ids_drops_unknown_and_deleted() {
        let db = test_db().await;
        let repo = FileRepo::new(&db);
        let a = create_file(&db, "a.jpg").await;
        let b = create_file(&db, "b.jpg").await;
        repo.delete_by_id(b.id).await.unwrap();

        assert_eq!(repo.existing_ids(&[a.id, b.id, 404]).await.unwrap(), [a.id]);
    }
}
