//! Data access layer: a generic soft-delete repository over every entity,
//! the polymorphic file association repository, and per-entity extensions.

mod base;
pub mod query;

pub mod album;
pub mod entity_file;
pub mod file;
pub mod moment;
pub mod place;
pub mod setting;
pub mod user;
pub mod wish;

pub use album::{AlbumLink, AlbumRepo, AlbumWithFiles};
pub use base::{BaseRepo, Eager, RepoError, SoftDelete};
pub use entity_file::EntityFileRepo;
pub use file::FileRepo;
pub use moment::{MomentEdit, MomentLink, MomentRepo, MomentWithRelations};
pub use place::{PlaceLink, PlaceRepo, PlaceWithImage};
pub use query::{
    FilterCondition, FilterOperator, FilterValue, NoLink, PageRequest, Preload, QueryOptions,
};
pub use setting::{SettingInput, SettingRepo};
pub use user::{UserLink, UserRepo, UserWithAvatar};
pub use wish::WishRepo;

use crate::entity::anniversary;

pub type AnniversaryRepo<'a, C> = BaseRepo<'a, C, anniversary::Entity>;

/// Entities without preloadable relations.
macro_rules! no_relations {
    ($($module:ident),+ $(,)?) => {
        $(
            #[async_trait::async_trait]
            impl Eager for crate::entity::$module::Entity {
                type Link = NoLink;
                type Loaded = crate::entity::$module::Model;

                async fn preload<C: sea_orm::ConnectionTrait>(
                    _conn: &C,
                    _rows: &mut [Self::Loaded],
                    preload: &Preload<NoLink>,
                ) -> Result<(), RepoError> {
                    match preload.link {}
                }
            }
        )+
    };
}

no_relations!(anniversary, entity_file, file, setting, wish);
