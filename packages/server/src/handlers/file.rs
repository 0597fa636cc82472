use axum::body::Body;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::file::{FileListResponse, UploadForm};
use crate::models::shared::{FileResponse, PageQuery};
use crate::service::file::{self, NewUpload};
use crate::state::AppState;

/// Multipart overhead allowed on top of `server.max_upload_size`.
const FORM_OVERHEAD: usize = 64 * 1024;

pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = usize::try_from(max_upload_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(limit.saturating_add(FORM_OVERHEAD))
}

#[utoipa::path(
    post,
    path = "/file/upload",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Upload a file",
    description = "Stores the `file` multipart field. Optional fields: `path` (directory prefix inside \
        the storage backend) and `hash` (hex SHA-256 the content must match). Content already \
        stored under the same hash is not written again; the existing file is returned.",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored or deduplicated", body = FileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max_size = state.config.server.max_upload_size;
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut prefix = String::new();
    let mut hash = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let mime_type = field.content_type().map(str::to_string);
                let data = read_limited(field, max_size).await?;
                upload = Some((filename, mime_type, data));
            }
            Some("path") => prefix = read_text(field, "path").await?,
            Some("hash") => hash = Some(read_text(field, "hash").await?),
            _ => {} // Ignore unknown fields.
        }
    }

    let (filename, mime_type, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }

    let stored = file::upload(
        &state,
        NewUpload {
            filename,
            mime_type,
            data,
            hash,
            prefix,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(file::response(&state, &stored).await)))
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))
}

/// Buffer a multipart field, rejecting it once it grows past `max_size`.
async fn read_limited(mut field: Field<'_>, max_size: u64) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        if (data.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

#[utoipa::path(
    get,
    path = "/file/{id}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download a file",
    description = "Streams the stored content. This is the same-origin proxy URL handed out in \
        `FileResponse.url` and is therefore public.",
    params(("id" = i64, Path, description = "File ID")),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(file_id))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
) -> Result<Response, AppError> {
    let (model, reader) = file::open(&state, file_id).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &model.mime_type)
        .header(header::CONTENT_LENGTH, model.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&model.original_name),
        )
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Build a safe `Content-Disposition` header value.
fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    // RFC 5987 percent-encoding for filename*.
    let encoded = percent_encoding::utf8_percent_encode(filename, RFC5987).to_string();

    format!("inline; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}

const RFC5987: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

#[utoipa::path(
    delete,
    path = "/file/{id}",
    tag = "Files",
    operation_id = "deleteFile",
    summary = "Delete a file",
    description = "Removes the stored content (best effort) and soft-deletes the file record.",
    params(("id" = i64, Path, description = "File ID")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(file_id))]
pub async fn delete_file(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    file::delete(&state, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/files/unused",
    tag = "Files",
    operation_id = "listUnusedFiles",
    summary = "List unused files",
    description = "Files that no album, moment, place or avatar history refers to.",
    params(PageQuery),
    responses(
        (status = 200, description = "Unused files", body = FileListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_unused_files(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FileListResponse>, AppError> {
    Ok(Json(file::list_unused(&state, query.page_request()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_an_ascii_fallback() {
        let value = content_disposition_value("海边 photo.jpg");
        assert!(value.starts_with("inline; filename=\"photo.jpg\""));
        assert!(value.ends_with("filename*=UTF-8''%E6%B5%B7%E8%BE%B9%20photo.jpg"));
        assert_eq!(
            content_disposition_value("\"\";"),
            "inline; filename=\"download\"; filename*=UTF-8''%22%22%3B"
        );
    }
}
