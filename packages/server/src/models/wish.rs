use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, required_text};
use crate::entity::wish;
use crate::error::AppError;
use crate::repo::PageRequest;

/// `?page=&size=&approved=` for `GET /wishes`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WishListQuery {
    /// 1-based page number (default 1).
    pub page: Option<i64>,
    /// Items per page (default 10, max 100).
    pub size: Option<i64>,
    /// Signed-in viewers only: `true` lists approved wishes, `false` the
    /// moderation queue. Omitted lists both.
    pub approved: Option<bool>,
}

impl WishListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.size.unwrap_or(0))
    }

    /// Approval filter for a viewer. Anonymous viewers always get approved
    /// wishes only.
    pub fn approved_filter(&self, signed_in: bool) -> Option<bool> {
        if signed_in { self.approved } else { Some(true) }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishResponse {
    pub id: i64,
    pub content: String,
    pub author_name: String,
    pub email: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<wish::Model> for WishResponse {
    fn from(model: wish::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            author_name: model.author_name,
            email: model.email,
            approved: model.approved,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishListResponse {
    pub wishes: Vec<WishResponse>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWishRequest {
    #[schema(example = "Happy anniversary!")]
    pub content: String,
    pub author_name: String,
    #[serde(default)]
    pub email: String,
}

/// Trimmed `(content, author_name, email)`.
pub fn validate_create_wish(
    payload: &CreateWishRequest,
) -> Result<(String, String, String), AppError> {
    let content = required_text(&payload.content, "content", 500)?;
    let author = required_text(&payload.author_name, "authorName", 100)?;
    let email = payload.email.trim();
    if !email.is_empty() && (email.len() > 150 || !email.contains('@')) {
        return Err(AppError::Validation("email is not valid".into()));
    }
    Ok((content, author, email.to_string()))
}
