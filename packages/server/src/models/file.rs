use serde::Serialize;

use super::shared::{FileResponse, Pagination};

/// Response for `GET /files/unused`.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    pub files: Vec<FileResponse>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Multipart body of `POST /file/upload`. Documentation only; the handler
/// reads the fields from the stream.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// File content.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Optional lowercase hex SHA-256 of the content. Must match when sent.
    pub hash: Option<String>,
    /// Optional directory prefix, e.g. `album`.
    pub path: Option<String>,
}
