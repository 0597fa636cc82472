use serde::{Deserialize, Serialize};

use super::shared::{FileResponse, Pagination, required_text};
use crate::error::AppError;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponse {
    pub id: i64,
    #[schema(example = "Summer 2024")]
    pub name: String,
    pub description: String,
    pub cover_image: Option<FileResponse>,
    #[schema(example = 12)]
    pub photo_count: i32,
    /// Creation date, `YYYY-MM-DD`.
    #[schema(example = "2024-07-01")]
    pub created_at: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumListResponse {
    pub albums: Vec<AlbumResponse>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPhotoResponse {
    pub album_id: i64,
    pub file: FileResponse,
    /// Alternative text, the original filename.
    pub alt: String,
    /// Upload time, `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPhotoListResponse {
    pub photos: Vec<AlbumPhotoResponse>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    #[schema(example = "Summer 2024")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlbumRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPhotosRequest {
    /// File ids. Duplicates are ignored.
    #[schema(example = json!([3, 4, 5]))]
    pub photo_ids: Vec<i64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetCoverRequest {
    /// A photo of the album, or `null` to clear the cover.
    pub photo_id: Option<i64>,
}

pub const MAX_NAME_LEN: usize = 100;

pub fn validate_create_album(payload: &CreateAlbumRequest) -> Result<String, AppError> {
    required_text(&payload.name, "name", MAX_NAME_LEN)
}

pub fn validate_photo_ids(ids: &[i64], max: usize) -> Result<(), AppError> {
    if ids.len() > max {
        return Err(AppError::Validation(format!("Too many photos: max {max}")));
    }
    if let Some(id) = ids.iter().find(|id| **id <= 0) {
        return Err(AppError::Validation(format!("Invalid photo id {id}")));
    }
    Ok(())
}
