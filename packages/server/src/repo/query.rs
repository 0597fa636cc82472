//! Declarative filtering, ordering and pagination shared by every repository.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use sea_orm::sea_query::{Alias, Expr, LikeExpr, SimpleExpr};
use sea_orm::{Order, QueryFilter, Value};
use tracing::warn;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Comparison applied by a [`FilterCondition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    /// Substring match. The value is used as a raw `LIKE` pattern with `\` as
    /// the escape character.
    Like,
    In,
    /// An operator spelling nobody understood. Conditions carrying it are
    /// skipped when the query is built.
    Unsupported(String),
}

impl FromStr for FilterOperator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" | "==" => FilterOperator::Eq,
            "ne" | "!=" | "<>" => FilterOperator::Ne,
            "gt" | ">" => FilterOperator::Gt,
            "lt" | "<" => FilterOperator::Lt,
            "gte" | ">=" => FilterOperator::Gte,
            "lte" | "<=" => FilterOperator::Lte,
            "like" => FilterOperator::Like,
            "in" => FilterOperator::In,
            _ => FilterOperator::Unsupported(s.to_string()),
        })
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOperator::Eq => f.write_str("="),
            FilterOperator::Ne => f.write_str("!="),
            FilterOperator::Gt => f.write_str(">"),
            FilterOperator::Lt => f.write_str("<"),
            FilterOperator::Gte => f.write_str(">="),
            FilterOperator::Lte => f.write_str("<="),
            FilterOperator::Like => f.write_str("LIKE"),
            FilterOperator::In => f.write_str("IN"),
            FilterOperator::Unsupported(raw) => write!(f, "{raw}?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Single(Value),
    List(Vec<Value>),
}

/// One `field op value` predicate. Conditions in a query are ANDed.
///
/// `field` is a column name, or `table.column` when the query joins several
/// tables. It is not checked against the entity; a bad name fails when the
/// statement executes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    fn single(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self::new(field, operator, FilterValue::Single(value.into()))
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, FilterOperator::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, FilterOperator::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, FilterOperator::Gt, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, FilterOperator::Lt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, FilterOperator::Gte, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, FilterOperator::Lte, value)
    }

    /// Substring match on `needle`. Wildcards inside `needle` match literally.
    pub fn contains(field: impl Into<String>, needle: &str) -> Self {
        Self::single(field, FilterOperator::Like, format!("%{}%", escape_like(needle)))
    }

    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(
            field,
            FilterOperator::In,
            FilterValue::List(values.into_iter().map(Into::into).collect()),
        )
    }

    fn to_expr(&self, table: &str) -> Option<SimpleExpr> {
        let col = column_ref(table, &self.field);
        let expr = match (&self.operator, &self.value) {
            (FilterOperator::Eq, FilterValue::Single(v)) => col.eq(v.clone()),
            (FilterOperator::Ne, FilterValue::Single(v)) => col.ne(v.clone()),
            (FilterOperator::Gt, FilterValue::Single(v)) => col.gt(v.clone()),
            (FilterOperator::Lt, FilterValue::Single(v)) => col.lt(v.clone()),
            (FilterOperator::Gte, FilterValue::Single(v)) => col.gte(v.clone()),
            (FilterOperator::Lte, FilterValue::Single(v)) => col.lte(v.clone()),
            (FilterOperator::Like, FilterValue::Single(Value::String(Some(pattern)))) => {
                col.like(LikeExpr::new(pattern.to_string()).escape('\\'))
            }
            (FilterOperator::In, FilterValue::List(values)) => col.is_in(values.iter().cloned()),
            (FilterOperator::In, FilterValue::Single(v)) => col.is_in([v.clone()]),
            (FilterOperator::Unsupported(raw), _) => {
                warn!(field = %self.field, operator = %raw, "skipping filter with unsupported operator");
                return None;
            }
            (op, value) => {
                warn!(field = %self.field, operator = %op, ?value, "skipping filter with mismatched value");
                return None;
            }
        };
        Some(expr)
    }
}

/// Column expression for `table.column`. A bare `column` is qualified with
/// `default_table`, so an unknown name fails on every backend instead of
/// reading as a string literal on SQLite.
pub(crate) fn column_ref(default_table: &str, field: &str) -> Expr {
    let (table, column) = field.split_once('.').unwrap_or((default_table, field));
    Expr::col((Alias::new(table), Alias::new(column)))
}

/// Escape `LIKE` wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// AND every condition into `query`. Bare field names refer to `table`.
pub fn apply_filters<Q: QueryFilter>(mut query: Q, table: &str, conditions: &[FilterCondition]) -> Q {
    for condition in conditions {
        if let Some(expr) = condition.to_expr(table) {
            query = query.filter(expr);
        }
    }
    query
}

/// Relation set of an entity without eager-loadable relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoLink {}

/// Eager-load `link` for every returned row, narrowing the related rows with
/// `conditions`.
#[derive(Debug, Clone)]
pub struct Preload<L> {
    pub link: L,
    pub conditions: Vec<FilterCondition>,
}

/// Options shared by every read in [`BaseRepo`](super::BaseRepo).
#[derive(Debug, Clone)]
pub struct QueryOptions<L = NoLink> {
    pub conditions: Vec<FilterCondition>,
    /// Single sort key. Ties are broken by id in the same direction.
    pub order: Option<(String, Order)>,
    pub preloads: Vec<Preload<L>>,
    /// Read with `FOR UPDATE` inside the caller's transaction.
    pub for_update: bool,
    /// Include soft-deleted rows.
    pub with_deleted: bool,
}

impl<L> Default for QueryOptions<L> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            order: None,
            preloads: Vec::new(),
            for_update: false,
            with_deleted: false,
        }
    }
}

impl<L> QueryOptions<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filters(mut self, conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: Order) -> Self {
        self.order = Some((field.into(), order));
        self
    }

    pub fn preload(self, link: L) -> Self {
        self.preload_where(link, Vec::new())
    }

    pub fn preload_where(mut self, link: L, conditions: Vec<FilterCondition>) -> Self {
        self.preloads.push(Preload { link, conditions });
        self
    }

    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    pub fn with_deleted(mut self) -> Self {
        self.with_deleted = true;
        self
    }
}

/// A validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl PageRequest {
    /// Clamp raw client input: `page < 1` becomes 1, `size < 1` becomes
    /// [`DEFAULT_PAGE_SIZE`] and `size` is capped at [`MAX_PAGE_SIZE`].
    pub fn new(page: i64, size: i64) -> Self {
        let page = page.max(1) as u64;
        let size = if size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            size.min(MAX_PAGE_SIZE)
        } as u64;
        Self { page, size }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.size
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    use super::*;
    use crate::entity::album;

    fn sql(conditions: &[FilterCondition]) -> String {
        apply_filters(album::Entity::find(), "albums", conditions)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn operator_parses_word_and_symbol_spellings() {
        assert_eq!("eq".parse::<FilterOperator>().unwrap(), FilterOperator::Eq);
        assert_eq!(">=".parse::<FilterOperator>().unwrap(), FilterOperator::Gte);
        assert_eq!(" LIKE ".parse::<FilterOperator>().unwrap(), FilterOperator::Like);
        assert_eq!("<>".parse::<FilterOperator>().unwrap(), FilterOperator::Ne);
        assert_eq!(
            "between".parse::<FilterOperator>().unwrap(),
            FilterOperator::Unsupported("between".into())
        );
    }

    #[test]
    fn conditions_are_anded() {
        let sql = sql(&[
            FilterCondition::eq("name", "trip"),
            FilterCondition::gte("photo_count", 3),
        ]);
        assert!(sql.contains(r#""albums"."name" = 'trip'"#), "{sql}");
        assert!(sql.contains(r#"AND "albums"."photo_count" >= 3"#), "{sql}");
    }

    #[test]
    fn unsupported_operator_is_skipped() {
        let sql = sql(&[
            FilterCondition::new(
                "name",
                "between".parse().unwrap(),
                FilterValue::Single("x".into()),
            ),
            FilterCondition::eq("id", 7),
        ]);
        let (_, filter) = sql.split_once("WHERE").unwrap();
        assert!(!filter.contains("name"), "{sql}");
        assert!(filter.contains(r#""albums"."id" = 7"#), "{sql}");
    }

    #[test]
    fn list_value_with_scalar_operator_is_skipped() {
        let sql = sql(&[FilterCondition::new(
            "id",
            FilterOperator::Gt,
            FilterValue::List(vec![1.into()]),
        )]);
        assert!(!sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn qualified_field_names_the_table() {
        let sql = sql(&[FilterCondition::is_in("files.mime_type", ["image/png", "image/jpeg"])]);
        assert!(
            sql.contains(r#""files"."mime_type" IN ('image/png', 'image/jpeg')"#),
            "{sql}"
        );
    }

    #[test]
    fn bare_field_is_qualified_with_the_queried_table() {
        let sql = sql(&[FilterCondition::ne("no_such_column", 1)]);
        assert!(sql.contains(r#""albums"."no_such_column" <> 1"#), "{sql}");
    }

    #[test]
    fn contains_escapes_wildcards() {
        let sql = sql(&[FilterCondition::contains("name", "50%_off")]);
        assert!(sql.contains(r#"LIKE '%50\%\_off%'"#), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn page_request_clamps_input() {
        assert_eq!(PageRequest::new(0, 0), PageRequest::new(1, 10));
        assert_eq!(PageRequest::new(-3, 500).size(), 100);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
        assert_eq!(PageRequest::new(1, 10).total_pages(0), 0);
        assert_eq!(PageRequest::new(1, 10).total_pages(21), 3);
    }
}
