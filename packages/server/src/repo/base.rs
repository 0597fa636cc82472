use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityName, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use super::query::{FilterCondition, Preload, PageRequest, QueryOptions, apply_filters, column_ref};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The row's current state forbids the change.
    #[error("{0}")]
    Conflict(String),
    /// The request does not fit the row it targets.
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Query(#[from] DbErr),
}

/// Columns every table carries. Rows with a non-null `deleted_at` are
/// invisible to default reads.
pub trait SoftDelete: EntityTrait {
    /// Human-readable entity name used in `NotFound` errors.
    const LABEL: &'static str;

    fn id_column() -> Self::Column;
    fn created_at_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;
}

/// Batch eager loading of an entity's relations.
///
/// `Link` enumerates the relations that can be preloaded and `Loaded` is the
/// row type carrying them. Each preload issues one query for the whole batch.
#[async_trait]
pub trait Eager: SoftDelete {
    type Link: Clone + fmt::Debug + Send + Sync;
    type Loaded: From<Self::Model> + Send + Sync;

    async fn preload<C: ConnectionTrait>(
        conn: &C,
        rows: &mut [Self::Loaded],
        preload: &Preload<Self::Link>,
    ) -> Result<(), RepoError>;
}

/// Generic soft-delete repository borrowing a connection or a transaction.
pub struct BaseRepo<'a, C, E> {
    conn: &'a C,
    entity: PhantomData<E>,
}

impl<'a, C, E> BaseRepo<'a, C, E>
where
    C: ConnectionTrait,
    E: Eager,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: Send,
{
    pub fn new(conn: &'a C) -> Self {
        Self {
            conn,
            entity: PhantomData,
        }
    }

    pub fn conn(&self) -> &'a C {
        self.conn
    }

    fn table() -> String {
        E::default().table_name().to_owned()
    }

    fn select(options: &QueryOptions<E::Link>) -> Select<E> {
        let mut select = E::find();
        if !options.with_deleted {
            select = select.filter(E::deleted_at_column().is_null());
        }
        apply_filters(select, &Self::table(), &options.conditions)
    }

    fn ordered(select: Select<E>, options: &QueryOptions<E::Link>) -> Select<E> {
        match &options.order {
            Some((field, order)) => select
                .order_by(column_ref(&Self::table(), field), order.clone())
                .order_by(E::id_column(), order.clone()),
            None => select.order_by_asc(E::id_column()),
        }
    }

    fn locked(select: Select<E>, options: &QueryOptions<E::Link>) -> Select<E> {
        if options.for_update {
            select.lock_exclusive()
        } else {
            select
        }
    }

    async fn load(
        &self,
        rows: Vec<E::Model>,
        preloads: &[Preload<E::Link>],
    ) -> Result<Vec<E::Loaded>, RepoError> {
        let mut loaded: Vec<E::Loaded> = rows.into_iter().map(Into::into).collect();
        if !loaded.is_empty() {
            for preload in preloads {
                E::preload(self.conn, &mut loaded, preload).await?;
            }
        }
        Ok(loaded)
    }

    /// Insert a row, stamping both timestamps.
    pub async fn create(&self, mut model: E::ActiveModel) -> Result<E::Model, RepoError> {
        let now = Utc::now();
        model.set(E::created_at_column(), now.into());
        model.set(E::updated_at_column(), now.into());
        Ok(model.insert(self.conn).await?)
    }

    /// Write every column of a live row and refresh `updated_at`.
    pub async fn update(&self, model: E::Model) -> Result<E::Model, RepoError> {
        let mut active = model.into_active_model().reset_all();
        active.set(E::updated_at_column(), Utc::now().into());
        match E::update(active)
            .filter(E::deleted_at_column().is_null())
            .exec(self.conn)
            .await
        {
            Ok(model) => Ok(model),
            Err(DbErr::RecordNotUpdated) => Err(RepoError::NotFound(E::LABEL)),
            Err(err) => Err(err.into()),
        }
    }

    /// Targeted `UPDATE ... SET col = expr WHERE id = ?` on a live row.
    pub async fn update_columns(
        &self,
        id: i64,
        columns: impl IntoIterator<Item = (E::Column, SimpleExpr)>,
    ) -> Result<(), RepoError> {
        let mut update = E::update_many()
            .col_expr(E::updated_at_column(), Expr::value(Utc::now()))
            .filter(E::id_column().eq(id))
            .filter(E::deleted_at_column().is_null());
        for (column, expr) in columns {
            update = update.col_expr(column, expr);
        }
        let result = update.exec(self.conn).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound(E::LABEL));
        }
        Ok(())
    }

    /// Soft delete. A missing or already deleted row is `NotFound`.
    pub async fn delete_by_id(&self, id: i64) -> Result<(), RepoError> {
        let now = Utc::now();
        let result = E::update_many()
            .col_expr(E::deleted_at_column(), Expr::value(now))
            .col_expr(E::updated_at_column(), Expr::value(now))
            .filter(E::id_column().eq(id))
            .filter(E::deleted_at_column().is_null())
            .exec(self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound(E::LABEL));
        }
        Ok(())
    }

    pub async fn find_by_id(
        &self,
        id: i64,
        options: &QueryOptions<E::Link>,
    ) -> Result<E::Loaded, RepoError> {
        let select = Self::select(options).filter(E::id_column().eq(id));
        let row = Self::locked(select, options)
            .one(self.conn)
            .await?
            .ok_or(RepoError::NotFound(E::LABEL))?;
        let mut rows = self.load(vec![row], &options.preloads).await?;
        rows.pop().ok_or(RepoError::NotFound(E::LABEL))
    }

    /// First row matching the conditions in the requested order.
    pub async fn find_one(&self, options: &QueryOptions<E::Link>) -> Result<E::Loaded, RepoError> {
        let select = Self::ordered(Self::select(options), options);
        let row = Self::locked(select, options)
            .one(self.conn)
            .await?
            .ok_or(RepoError::NotFound(E::LABEL))?;
        let mut rows = self.load(vec![row], &options.preloads).await?;
        rows.pop().ok_or(RepoError::NotFound(E::LABEL))
    }

    /// Every matching row. There is no implicit limit.
    pub async fn list(&self, options: &QueryOptions<E::Link>) -> Result<Vec<E::Loaded>, RepoError> {
        let select = Self::ordered(Self::select(options), options);
        let rows = Self::locked(select, options).all(self.conn).await?;
        self.load(rows, &options.preloads).await
    }

    /// One page of matching rows plus the total match count.
    pub async fn find_with_pagination(
        &self,
        page: PageRequest,
        options: &QueryOptions<E::Link>,
    ) -> Result<(Vec<E::Loaded>, u64), RepoError> {
        let select = Self::select(options);
        let total = select.clone().count(self.conn).await?;
        let rows = Self::locked(Self::ordered(select, options), options)
            .offset(page.offset())
            .limit(page.size())
            .all(self.conn)
            .await?;
        Ok((self.load(rows, &options.preloads).await?, total))
    }

    pub async fn count(&self, options: &QueryOptions<E::Link>) -> Result<u64, RepoError> {
        Ok(Self::select(options).count(self.conn).await?)
    }

    pub async fn count_where(&self, conditions: &[FilterCondition]) -> Result<u64, RepoError> {
        let options = QueryOptions::<E::Link>::new().filters(conditions.iter().cloned());
        self.count(&options).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{Order, Set};

    use super::*;
    use crate::database::test_db;
    use crate::entity::{anniversary, wish};
    use crate::repo::query::FilterCondition;

    type WishRepo<'a> = BaseRepo<'a, sea_orm::DatabaseConnection, wish::Entity>;

    fn wish(author: &str, approved: bool) -> wish::ActiveModel {
        wish::ActiveModel {
            content: Set(format!("congrats from {author}")),
            author_name: Set(author.to_string()),
            email: Set(String::new()),
            approved: Set(approved),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_stamps_timestamps() {
        let db = test_db().await;
        let created = WishRepo::new(&db).create(wish("ann", false)).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);
        assert!(created.deleted_at.is_none());
    }

    #[tokio::test]
    async fn soft_deleted_rows_are_hidden_unless_requested() {
        let db = test_db().await;
        let repo = WishRepo::new(&db);
        let kept = repo.create(wish("ann", true)).await.unwrap();
        let gone = repo.create(wish("bob", true)).await.unwrap();

        repo.delete_by_id(gone.id).await.unwrap();

        let live = repo.list(&QueryOptions::new()).await.unwrap();
        assert_eq!(live.iter().map(|w| w.id).collect::<Vec<_>>(), vec![kept.id]);
        assert!(matches!(
            repo.find_by_id(gone.id, &QueryOptions::new()).await,
            Err(RepoError::NotFound("wish"))
        ));

        let all = repo.list(&QueryOptions::new().with_deleted()).await.unwrap();
        assert_eq!(all.len(), 2);
        let tombstone = repo
            .find_by_id(gone.id, &QueryOptions::new().with_deleted())
            .await
            .unwrap();
        assert!(tombstone.deleted_at.is_some());
        assert_eq!(repo.count(&QueryOptions::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let db = test_db().await;
        let repo = WishRepo::new(&db);
        let row = repo.create(wish("ann", false)).await.unwrap();

        repo.delete_by_id(row.id).await.unwrap();
        assert!(matches!(
            repo.delete_by_id(row.id).await,
            Err(RepoError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete_by_id(9999).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_replaces_row_and_rejects_deleted() {
        let db = test_db().await;
        let repo = WishRepo::new(&db);
        let mut row = repo.create(wish("ann", false)).await.unwrap();

        row.content = "edited".into();
        row.approved = true;
        let updated = repo.update(row.clone()).await.unwrap();
        assert_eq!(updated.content, "edited");
        assert!(updated.approved);
        assert!(updated.updated_at >= updated.created_at);

        repo.delete_by_id(row.id).await.unwrap();
        assert!(matches!(
            repo.update(row).await,
            Err(RepoError::NotFound("wish"))
        ));
    }

    #[tokio::test]
    async fn pages_concatenate_to_the_full_ordered_list() {
        let db = test_db().await;
        let repo = BaseRepo::<_, anniversary::Entity>::new(&db);
        // Duplicate dates force the id tie-break.
        for (i, date) in ["2020-01-01", "2021-05-20", "2020-01-01", "2019-02-14", "2021-05-20", "2020-01-01", "2018-08-08"]
            .into_iter()
            .enumerate()
        {
            repo.create(anniversary::ActiveModel {
                title: Set(format!("a{i}")),
                date: Set(date.to_string()),
                description: Set(String::new()),
                calendar: Set(anniversary::Calendar::Solar),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        for order in [Order::Asc, Order::Desc] {
            let options = QueryOptions::new().order_by("date", order.clone());
            let full: Vec<i64> = repo.list(&options).await.unwrap().iter().map(|a| a.id).collect();

            let mut paged = Vec::new();
            for page in 1..=3 {
                let (rows, total) = repo
                    .find_with_pagination(PageRequest::new(page, 3), &options)
                    .await
                    .unwrap();
                assert_eq!(total, 7);
                paged.extend(rows.iter().map(|a| a.id));
            }
            assert_eq!(paged, full, "{order:?}");
        }
    }

    #[tokio::test]
    async fn filters_apply_to_count_and_fetch() {
        let db = test_db().await;
        let repo = WishRepo::new(&db);
        for (name, approved) in [("ann", true), ("bob", false), ("cat", true), ("dan", true)] {
            repo.create(wish(name, approved)).await.unwrap();
        }

        let options = QueryOptions::new()
            .filter(FilterCondition::eq("approved", true))
            .order_by("author_name", Order::Desc);
        let (rows, total) = repo
            .find_with_pagination(PageRequest::new(1, 2), &options)
            .await
            .unwrap();
        assert_eq!(total, 3);
        let names: Vec<_> = rows.iter().map(|w| w.author_name.as_str()).collect();
        assert_eq!(names, ["dan", "cat"]);

        assert_eq!(
            repo.count_where(&[FilterCondition::contains("content", "from b")])
                .await
                .unwrap(),
            1
        );
        let first = repo.find_one(&options).await.unwrap();
        assert_eq!(first.author_name, "dan");
    }

    #[tokio::test]
    async fn unknown_column_is_a_query_error() {
        let db = test_db().await;
        let repo = WishRepo::new(&db);
        repo.create(wish("ann", true)).await.unwrap();

        for condition in [
            FilterCondition::eq("no_such_column", 1),
            FilterCondition::ne("no_such_column", 1),
            FilterCondition::eq("wishes.no_such_column", 1),
        ] {
            let options = QueryOptions::new().filter(condition);
            assert!(matches!(repo.list(&options).await, Err(RepoError::Query(_))));
            assert!(matches!(repo.count(&options).await, Err(RepoError::Query(_))));
        }

        let ordered = QueryOptions::new().order_by("no_such_column", Order::Asc);
        assert!(matches!(repo.list(&ordered).await, Err(RepoError::Query(_))));
    }

    #[tokio::test]
    async fn for_update_reads_inside_a_transaction() {
        use sea_orm::TransactionTrait;

        let db = test_db().await;
        let row = WishRepo::new(&db).create(wish("ann", false)).await.unwrap();

        let txn = db.begin().await.unwrap();
        let locked = BaseRepo::<_, wish::Entity>::new(&txn)
            .find_by_id(row.id, &QueryOptions::new().for_update())
            .await
            .unwrap();
        txn.commit().await.unwrap();
        assert_eq!(locked.id, row.id);
    }
}
