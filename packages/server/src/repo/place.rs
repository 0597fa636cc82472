use async_trait::async_trait;
use sea_orm::{ConnectionTrait, TransactionTrait};

use super::base::{BaseRepo, Eager, RepoError};
use super::entity_file::EntityFileRepo;
use super::file::load_by_ids;
use super::query::{Preload, QueryOptions};
use crate::entity::entity_file::EntityType;
use crate::entity::{file, place};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceLink {
    Image,
}

#[derive(Debug, Clone)]
pub struct PlaceWithImage {
    pub place: place::Model,
    pub image: Option<file::Model>,
}

impl From<place::Model> for PlaceWithImage {
    fn from(place: place::Model) -> Self {
        Self { place, image: None }
    }
}

#[async_trait]
impl Eager for place::Entity {
    type Link = PlaceLink;
    type Loaded = PlaceWithImage;

    async fn preload<C: ConnectionTrait>(
        conn: &C,
        rows: &mut [PlaceWithImage],
        preload: &Preload<PlaceLink>,
    ) -> Result<(), RepoError> {
        match preload.link {
            PlaceLink::Image => {
                let ids: Vec<i64> = rows.iter().filter_map(|r| r.place.image_id).collect();
                let files = load_by_ids(conn, &ids, &preload.conditions).await?;
                for row in rows.iter_mut() {
                    row.image = row.place.image_id.and_then(|id| files.get(&id).cloned());
                }
            }
        }
        Ok(())
    }
}

pub type PlaceRepo<'a, C> = BaseRepo<'a, C, place::Entity>;

impl<'a, C: ConnectionTrait + TransactionTrait> BaseRepo<'a, C, place::Entity> {
    pub async fn create_with_image(&self, model: place::ActiveModel) -> Result<place::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let created = PlaceRepo::new(&txn).create(model).await?;
        if let Some(image_id) = created.image_id {
            EntityFileRepo::new(&txn)
                .associate(created.id, EntityType::Place, image_id)
                .await?;
        }
        txn.commit().await?;
        Ok(created)
    }

    /// Save the place, moving the image association when `image_id` changed.
    pub async fn update_with_image(&self, model: place::Model) -> Result<place::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let repo = PlaceRepo::new(&txn);
        let previous = repo
            .find_by_id(model.id, &QueryOptions::new().for_update())
            .await?
            .place;
        let updated = repo.update(model).await?;

        if previous.image_id != updated.image_id {
            let links = EntityFileRepo::new(&txn);
            links.delete_by_entity(updated.id, EntityType::Place).await?;
            if let Some(image_id) = updated.image_id {
                links.associate(updated.id, EntityType::Place, image_id).await?;
            }
        }

        txn.commit().await?;
        Ok(updated)
    }

    pub async fn delete_with_image(&self, place_id: i64) -> Result<(), RepoError> {
        let txn = self.conn().begin().await?;
        PlaceRepo::new(&txn).delete_by_id(place_id).await?;
        EntityFileRepo::new(&txn)
            .delete_by_entity(place_id, EntityType::Place)
            .await?;
        txn.commit().await?;
        Ok(())
    }
}
