use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};

use super::base::{BaseRepo, Eager, RepoError};
use super::entity_file::EntityFileRepo;
use super::file::load_by_ids;
use super::query::{Preload, QueryOptions};
use crate::entity::entity_file::EntityType;
use crate::entity::{album, file};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumLink {
    CoverImage,
    Photos,
}

#[derive(Debug, Clone)]
pub struct AlbumWithFiles {
    pub album: album::Model,
    pub cover_image: Option<file::Model>,
    pub photos: Vec<file::Model>,
}

impl From<album::Model> for AlbumWithFiles {
    fn from(album: album::Model) -> Self {
        Self {
            album,
            cover_image: None,
            photos: Vec::new(),
        }
    }
}

#[async_trait]
impl Eager for album::Entity {
    type Link = AlbumLink;
    type Loaded = AlbumWithFiles;

    async fn preload<C: ConnectionTrait>(
        conn: &C,
        rows: &mut [AlbumWithFiles],
        preload: &Preload<AlbumLink>,
    ) -> Result<(), RepoError> {
        match preload.link {
            AlbumLink::CoverImage => {
                let ids: Vec<i64> = rows.iter().filter_map(|r| r.album.cover_image_id).collect();
                let files = load_by_ids(conn, &ids, &preload.conditions).await?;
                for row in rows.iter_mut() {
                    row.cover_image = row
                        .album
                        .cover_image_id
                        .and_then(|id| files.get(&id).cloned());
                }
            }
            AlbumLink::Photos => {
                let ids: Vec<i64> = rows.iter().map(|r| r.album.id).collect();
                let mut by_album: HashMap<i64, Vec<file::Model>> = HashMap::new();
                for (album_id, file) in EntityFileRepo::new(conn)
                    .files_for_entities(EntityType::Album, &ids, &preload.conditions)
                    .await?
                {
                    by_album.entry(album_id).or_default().push(file);
                }
                for row in rows.iter_mut() {
                    row.photos = by_album.remove(&row.album.id).unwrap_or_default();
                }
            }
        }
        Ok(())
    }
}

pub type AlbumRepo<'a, C> = BaseRepo<'a, C, album::Entity>;

/// `photo_count - n`, never below zero.
fn decrement_floored(n: i64) -> SimpleExpr {
    let count = Expr::col(album::Column::PhotoCount);
    Expr::case(
        Expr::col(album::Column::PhotoCount).gte(n),
        count.sub(n),
    )
    .finally(0)
    .into()
}

fn deduplicate(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

impl<'a, C: ConnectionTrait> BaseRepo<'a, C, album::Entity> {
    /// Total photos across live albums.
    pub async fn total_photos(&self) -> Result<i64, RepoError> {
        let sum: Option<Option<i64>> = album::Entity::find()
            .select_only()
            .column_as(album::Column::PhotoCount.sum(), "total")
            .filter(album::Column::DeletedAt.is_null())
            .into_tuple()
            .one(self.conn())
            .await?;
        Ok(sum.flatten().unwrap_or(0))
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> BaseRepo<'a, C, album::Entity> {
    /// Add photos not already in the album. Returns the updated album.
    pub async fn append_photos(
        &self,
        album_id: i64,
        file_ids: &[i64],
    ) -> Result<album::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let repo = AlbumRepo::new(&txn);
        let links = EntityFileRepo::new(&txn);
        repo.find_by_id(album_id, &QueryOptions::new().for_update())
            .await?;

        let existing: HashSet<i64> = links
            .list_by_entity(album_id, EntityType::Album)
            .await?
            .into_iter()
            .map(|link| link.file_id)
            .collect();
        let added: Vec<i64> = deduplicate(file_ids)
            .into_iter()
            .filter(|id| !existing.contains(id))
            .collect();

        if !added.is_empty() {
            links.batch_associate(album_id, EntityType::Album, &added).await?;
            repo.update_columns(
                album_id,
                [(
                    album::Column::PhotoCount,
                    Expr::col(album::Column::PhotoCount).add(added.len() as i64),
                )],
            )
            .await?;
        }

        let album = repo.find_by_id(album_id, &QueryOptions::new()).await?;
        txn.commit().await?;
        Ok(album.album)
    }

    /// Make the album hold exactly `file_ids`. The cover is cleared when it
    /// is no longer part of the set.
    pub async fn replace_photos(
        &self,
        album_id: i64,
        file_ids: &[i64],
    ) -> Result<album::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let repo = AlbumRepo::new(&txn);
        let links = EntityFileRepo::new(&txn);
        let current = repo
            .find_by_id(album_id, &QueryOptions::new().for_update())
            .await?
            .album;

        let ids = deduplicate(file_ids);
        links.delete_by_entity(album_id, EntityType::Album).await?;
        links.batch_associate(album_id, EntityType::Album, &ids).await?;

        let cover = current.cover_image_id.filter(|id| ids.contains(id));
        repo.update_columns(
            album_id,
            [
                (album::Column::PhotoCount, Expr::value(ids.len() as i32)),
                (album::Column::CoverImageId, Expr::value(cover)),
            ],
        )
        .await?;

        let album = repo.find_by_id(album_id, &QueryOptions::new()).await?;
        txn.commit().await?;
        Ok(album.album)
    }

    /// Unlink one photo. Removing a photo that is not in the album changes
    /// nothing.
    pub async fn remove_photo(&self, album_id: i64, file_id: i64) -> Result<album::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let repo = AlbumRepo::new(&txn);
        let current = repo
            .find_by_id(album_id, &QueryOptions::new().for_update())
            .await?
            .album;

        let removed = EntityFileRepo::new(&txn)
            .remove_association(album_id, EntityType::Album, file_id)
            .await?;
        if removed > 0 {
            let mut columns = vec![(album::Column::PhotoCount, decrement_floored(removed as i64))];
            if current.cover_image_id == Some(file_id) {
                columns.push((album::Column::CoverImageId, Expr::value(Option::<i64>::None)));
            }
            repo.update_columns(album_id, columns).await?;
        }

        let album = repo.find_by_id(album_id, &QueryOptions::new()).await?;
        txn.commit().await?;
        Ok(album.album)
    }

    /// Rename or re-describe the album. Counters and the cover are left to
    /// the photo operations.
    pub async fn update_details(
        &self,
        album_id: i64,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<album::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let repo = AlbumRepo::new(&txn);
        repo.find_by_id(album_id, &QueryOptions::new().for_update())
            .await?;

        let mut columns = Vec::new();
        if let Some(name) = name {
            columns.push((album::Column::Name, Expr::value(name)));
        }
        if let Some(description) = description {
            columns.push((album::Column::Description, Expr::value(description)));
        }
        repo.update_columns(album_id, columns).await?;

        let album = repo.find_by_id(album_id, &QueryOptions::new()).await?;
        txn.commit().await?;
        Ok(album.album)
    }

    /// Point the cover at one of the album's photos, or clear it. Membership
    /// is checked under the row lock.
    pub async fn set_cover(
        &self,
        album_id: i64,
        file_id: Option<i64>,
    ) -> Result<album::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let repo = AlbumRepo::new(&txn);
        repo.find_by_id(album_id, &QueryOptions::new().for_update())
            .await?;
        if let Some(file_id) = file_id {
            let owners = EntityFileRepo::new(&txn)
                .associated_entities(file_id, EntityType::Album)
                .await?;
            if !owners.contains(&album_id) {
                return Err(RepoError::Invalid(format!(
                    "photo {file_id} is not in album {album_id}"
                )));
            }
        }
        repo.update_columns(album_id, [(album::Column::CoverImageId, Expr::value(file_id))])
            .await?;
        let album = repo.find_by_id(album_id, &QueryOptions::new()).await?;
        txn.commit().await?;
        Ok(album.album)
    }

    /// Soft-delete an empty album and drop any leftover links. An album
    /// that still counts photos is a `Conflict`.
    pub async fn delete_empty(&self, album_id: i64) -> Result<(), RepoError> {
        let txn = self.conn().begin().await?;
        let repo = AlbumRepo::new(&txn);
        let current = repo
            .find_by_id(album_id, &QueryOptions::new().for_update())
            .await?
            .album;
        if current.photo_count > 0 {
            tracing::warn!(
                album_id,
                photo_count = current.photo_count,
                "refusing to delete non-empty album"
            );
            return Err(RepoError::Conflict(
                "album still has photos; remove them first".into(),
            ));
        }
        repo.delete_by_id(album_id).await?;
        EntityFileRepo::new(&txn)
            .delete_by_entity(album_id, EntityType::Album)
            .await?;
        txn.commit().await?;
        Ok(())
    }
}
