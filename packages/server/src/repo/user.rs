use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

use super::base::{BaseRepo, Eager, RepoError};
use super::entity_file::EntityFileRepo;
use super::file::load_by_ids;
use super::query::{FilterCondition, Preload, QueryOptions};
use crate::entity::entity_file::EntityType;
use crate::entity::user::{self, Role};
use crate::entity::file;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLink {
    Avatar,
}

#[derive(Debug, Clone)]
pub struct UserWithAvatar {
    pub user: user::Model,
    pub avatar: Option<file::Model>,
}

impl From<user::Model> for UserWithAvatar {
    fn from(user: user::Model) -> Self {
        Self { user, avatar: None }
    }
}

#[async_trait]
impl Eager for user::Entity {
    type Link = UserLink;
    type Loaded = UserWithAvatar;

    async fn preload<C: ConnectionTrait>(
        conn: &C,
        rows: &mut [UserWithAvatar],
        preload: &Preload<UserLink>,
    ) -> Result<(), RepoError> {
        match preload.link {
            UserLink::Avatar => {
                let ids: Vec<i64> = rows.iter().filter_map(|r| r.user.avatar_id).collect();
                let files = load_by_ids(conn, &ids, &preload.conditions).await?;
                for row in rows.iter_mut() {
                    row.avatar = row.user.avatar_id.and_then(|id| files.get(&id).cloned());
                }
            }
        }
        Ok(())
    }
}

pub type UserRepo<'a, C> = BaseRepo<'a, C, user::Entity>;

impl<'a, C: ConnectionTrait> BaseRepo<'a, C, user::Entity> {
    /// Live user whose email or name equals `key`.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<user::Model>, RepoError> {
        Ok(user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(key))
                    .add(user::Column::Name.eq(key)),
            )
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::Id)
            .one(self.conn())
            .await?)
    }

    /// The account holding `role`, with its avatar.
    pub async fn find_by_role(&self, role: Role) -> Result<Option<UserWithAvatar>, RepoError> {
        let options = QueryOptions::new()
            .filter(FilterCondition::eq("role", role))
            .preload(UserLink::Avatar);
        match self.find_one(&options).await {
            Ok(user) => Ok(Some(user)),
            Err(RepoError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> BaseRepo<'a, C, user::Entity> {
    /// Insert a user and record its avatar, if any, in the avatar history.
    pub async fn create_with_avatar(&self, model: user::ActiveModel) -> Result<user::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let created = UserRepo::new(&txn).create(model).await?;
        if let Some(avatar_id) = created.avatar_id {
            EntityFileRepo::new(&txn)
                .associate(created.id, EntityType::UserAvatar, avatar_id)
                .await?;
        }
        txn.commit().await?;
        Ok(created)
    }

    /// Save the user. A changed `avatar_id` swaps the avatar association in
    /// the same transaction.
    pub async fn update_with_avatar(&self, model: user::Model) -> Result<user::Model, RepoError> {
        let txn = self.conn().begin().await?;
        let repo = UserRepo::new(&txn);
        let previous = repo
            .find_by_id(model.id, &QueryOptions::new().for_update())
            .await?
            .user;
        let updated = repo.update(model).await?;

        if previous.avatar_id != updated.avatar_id {
            let links = EntityFileRepo::new(&txn);
            if let Some(old) = previous.avatar_id {
                links
                    .remove_association(updated.id, EntityType::UserAvatar, old)
                    .await?;
            }
            if let Some(new) = updated.avatar_id {
                links
                    .associate(updated.id, EntityType::UserAvatar, new)
                    .await?;
            }
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Drop one file from the avatar history, clearing the current avatar if
    /// it was that file.
    pub async fn remove_avatar(&self, user_id: i64, file_id: i64) -> Result<(), RepoError> {
        let txn = self.conn().begin().await?;
        let repo = UserRepo::new(&txn);
        let current = repo
            .find_by_id(user_id, &QueryOptions::new().for_update())
            .await?
            .user;
        EntityFileRepo::new(&txn)
            .remove_association(user_id, EntityType::UserAvatar, file_id)
            .await?;
        if current.avatar_id == Some(file_id) {
            repo.update_columns(
                user_id,
                [(user::Column::AvatarId, Expr::value(Option::<i64>::None))],
            )
            .await?;
        }
        txn.commit().await?;
        Ok(())
    }
}
