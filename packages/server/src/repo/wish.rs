use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, TransactionTrait};

use super::base::{BaseRepo, RepoError};
use super::query::{FilterCondition, QueryOptions};
use crate::entity::wish;

pub type WishRepo<'a, C> = BaseRepo<'a, C, wish::Entity>;

impl<'a, C: ConnectionTrait> BaseRepo<'a, C, wish::Entity> {
    pub async fn count_pending(&self) -> Result<u64, RepoError> {
        self.count_where(&[FilterCondition::eq("approved", false)])
            .await
    }
}

impl<'a, C: ConnectionTrait + TransactionTrait> BaseRepo<'a, C, wish::Entity> {
    /// Mark the wish approved with a targeted update under a row lock.
    pub async fn approve(&self, wish_id: i64) -> Result<(), RepoError> {
        let txn = self.conn().begin().await?;
        let repo = WishRepo::new(&txn);
        repo.find_by_id(wish_id, &QueryOptions::new().for_update())
            .await?;
        repo.update_columns(wish_id, [(wish::Column::Approved, Expr::value(true))])
            .await?;
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::ActiveValue::Set;

    use super::*;
    use crate::database::test_db;

    #[tokio::test]
    async fn approving_moves_a_wish_out_of_pending() {
        let db = test_db().await;
        let repo = WishRepo::new(&db);
        let wish = repo
            .create(wish::ActiveModel {
                content: Set("be happy".into()),
                author_name: Set("friend".into()),
                email: Set(String::new()),
                approved: Set(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(repo.count_pending().await.unwrap(), 1);

        repo.approve(wish.id).await.unwrap();

        assert_eq!(repo.count_pending().await.unwrap(), 0);
        assert!(matches!(
            repo.approve(404).await,
            Err(RepoError::NotFound("wish"))
        ));
    }
}
