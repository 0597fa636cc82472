use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;
use crate::repo::PageRequest;

/// `?page=&size=` query parameters. Out-of-range values are clamped.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    pub page: Option<i64>,
    /// Items per page (default 10, max 100).
    pub size: Option<i64>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.size.unwrap_or(0))
    }
}

/// Pagination metadata flattened into list responses.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 10)]
    pub size: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 5)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: PageRequest, total: u64) -> Self {
        Self {
            page: page.page(),
            size: page.size(),
            total,
            total_pages: page.total_pages(total),
        }
    }
}

/// A stored file as seen by clients.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    #[schema(example = 42)]
    pub id: i64,
    /// Full-size URL.
    #[schema(example = "http://localhost:8182/api/v1/file/42")]
    pub url: String,
    /// 200x200 thumbnail URL. Equal to `url` without an image proxy.
    pub thumbnail: String,
    /// Original upload filename.
    #[schema(example = "beach.jpg")]
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    #[schema(example = "image/jpeg")]
    pub mime_type: String,
}

/// Serde helper for nullable fields in update requests.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Trimmed, non-empty text of at most `max` characters.
pub fn required_text(value: &str, field: &str, max: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Validate a `YYYY-MM-DD` date string.
pub fn validate_date(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{field} must be a YYYY-MM-DD date")))?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_clamps() {
        let page = PageQuery::default().page_request();
        assert_eq!((page.page(), page.size()), (1, 10));

        let page = PageQuery {
            page: Some(-3),
            size: Some(1000),
        }
        .page_request();
        assert_eq!((page.page(), page.size()), (1, 100));
    }

    #[test]
    fn pagination_rounds_pages_up() {
        let meta = Pagination::new(PageRequest::new(2, 10), 21);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.page, 2);
    }

    #[test]
    fn text_and_date_validation() {
        assert_eq!(required_text("  Trip ", "name", 10).unwrap(), "Trip");
        assert!(required_text("   ", "name", 10).is_err());
        assert!(required_text(&"x".repeat(11), "name", 10).is_err());
        assert!(validate_date("2024-02-29", "date").is_ok());
        assert!(validate_date("2023-02-29", "date").is_err());
        assert!(validate_date("02-14", "date").is_err());
    }
}
