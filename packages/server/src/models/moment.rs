use serde::{Deserialize, Serialize};

use super::shared::{FileResponse, Pagination};
use crate::error::AppError;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomentAuthor {
    pub name: String,
    pub avatar: Option<FileResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomentResponse {
    pub id: i64,
    #[schema(example = "First snow together")]
    pub content: String,
    pub images: Vec<FileResponse>,
    pub likes: i32,
    pub is_public: bool,
    pub author: Option<MomentAuthor>,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomentListResponse {
    pub moments: Vec<MomentResponse>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMomentRequest {
    pub content: String,
    #[serde(default)]
    pub image_ids: Vec<i64>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMomentRequest {
    pub content: Option<String>,
    /// Replaces the image set when present.
    pub image_ids: Option<Vec<i64>>,
    pub is_public: Option<bool>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomentVisibilityRequest {
    pub is_public: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomentLikeResponse {
    /// Like count after the increment.
    pub likes: i32,
}

pub const MAX_CONTENT_LEN: usize = 5000;
pub const MAX_IMAGES: usize = 18;

pub fn validate_content(content: &str) -> Result<String, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("content must not be empty".into()));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(AppError::Validation(format!(
            "content must be at most {MAX_CONTENT_LEN} characters"
        )));
    }
    Ok(content.to_string())
}

pub fn validate_image_ids(ids: &[i64]) -> Result<(), AppError> {
    if ids.len() > MAX_IMAGES {
        return Err(AppError::Validation(format!(
            "Too many images: max {MAX_IMAGES}"
        )));
    }
    Ok(())
}
