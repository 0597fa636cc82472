//! Uploads, downloads and client-facing URLs of stored files.

use chrono::Utc;
use common::storage::{BoxReader, ContentHash};
use futures::future::join_all;
use sea_orm::ActiveValue::Set;

use crate::entity::file;
use crate::error::AppError;
use crate::models::file::FileListResponse;
use crate::models::shared::{FileResponse, Pagination};
use crate::repo::{FileRepo, PageRequest, QueryOptions};
use crate::state::AppState;
use crate::utils::filename::{display_name, stored_path, validate_prefix};

/// Thumbnail edge length in pixels.
pub const THUMBNAIL_SIZE: u32 = 200;

/// An upload read from a multipart request.
pub struct NewUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
    /// Client-declared hex SHA-256 of `data`.
    pub hash: Option<String>,
    /// Directory prefix inside the backend.
    pub prefix: String,
}

/// Store an upload, or return the live file that already holds the same
/// content without writing anything.
pub async fn upload(state: &AppState, upload: NewUpload) -> Result<file::Model, AppError> {
    let computed = ContentHash::compute(&upload.data);
    if let Some(declared) = upload.hash.as_deref().filter(|h| !h.trim().is_empty()) {
        if ContentHash::from_hex(declared)? != computed {
            return Err(AppError::Validation(
                "hash does not match the uploaded content".into(),
            ));
        }
    }
    let hash = computed.to_hex();

    let repo = FileRepo::new(&state.db);
    if let Some(existing) = repo.find_by_hash(&hash).await? {
        tracing::info!(file_id = existing.id, %hash, "upload deduplicated");
        return Ok(existing);
    }

    let prefix = validate_prefix(&upload.prefix).map_err(|e| AppError::Validation(e.into()))?;
    let name = display_name(&upload.filename);
    let mime_type = upload
        .mime_type
        .filter(|m| m.contains('/') && m != "application/octet-stream")
        .unwrap_or_else(|| {
            mime_guess::from_path(&name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .ok_or_else(|| AppError::Internal("clock out of range".into()))?;
    let path = stored_path(prefix, nanos, &mime_type);
    let size = upload.data.len() as i64;

    state.storage.save_bytes(&path, upload.data).await?;

    let created = repo
        .create(file::ActiveModel {
            original_name: Set(name),
            storage: Set(state.storage.name().to_string()),
            path: Set(path.clone()),
            size: Set(size),
            mime_type: Set(mime_type),
            hash: Set(Some(hash)),
            ..Default::default()
        })
        .await;

    match created {
        Ok(model) => {
            tracing::info!(file_id = model.id, path, size, "file stored");
            Ok(model)
        }
        Err(err) => {
            if let Err(cleanup) = state.storage.delete(&path).await {
                tracing::warn!(path, error = %cleanup, "failed to remove orphaned content");
            }
            Err(err.into())
        }
    }
}

/// Live file row, checked against the active backend.
pub async fn find(state: &AppState, file_id: i64) -> Result<file::Model, AppError> {
    let file = FileRepo::new(&state.db)
        .find_by_id(file_id, &QueryOptions::new())
        .await?;
    ensure_backend(state, &file)?;
    Ok(file)
}

pub fn ensure_backend(state: &AppState, file: &file::Model) -> Result<(), AppError> {
    let active = state.storage.name();
    if file.storage != active {
        return Err(AppError::StorageMismatch {
            file_id: file.id,
            expected: active,
            actual: file.storage.clone(),
        });
    }
    Ok(())
}

/// Open the content of a file for streaming.
pub async fn open(state: &AppState, file_id: i64) -> Result<(file::Model, BoxReader), AppError> {
    let file = find(state, file_id).await?;
    let reader = state.storage.open(&file.path).await?;
    Ok((file, reader))
}

/// Remove the stored content, then soft-delete the row. A failure to remove
/// the content is logged and does not keep the row alive.
pub async fn delete(state: &AppState, file_id: i64) -> Result<(), AppError> {
    let file = find(state, file_id).await?;
    if let Err(err) = state.storage.delete(&file.path).await {
        tracing::error!(file_id, path = file.path, error = %err, "failed to delete stored content");
    }
    FileRepo::new(&state.db).delete_by_id(file_id).await?;
    Ok(())
}

/// Files no live association refers to.
pub async fn list_unused(state: &AppState, page: PageRequest) -> Result<FileListResponse, AppError> {
    let (files, total) = FileRepo::new(&state.db).find_unused(page).await?;
    Ok(FileListResponse {
        files: responses(state, &files).await,
        pagination: Pagination::new(page, total),
    })
}

/// Build the client view of a file. URL failures leave the field empty.
pub async fn response(state: &AppState, file: &file::Model) -> FileResponse {
    let proxy = |id: i64| state.config.server.file_url(id);
    let url = match state.storage.url(file.id, &file.path, 0, 0, &proxy).await {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!(file_id = file.id, error = %err, "failed to build file url");
            String::new()
        }
    };
    let thumbnail = match state
        .storage
        .url(file.id, &file.path, THUMBNAIL_SIZE, THUMBNAIL_SIZE, &proxy)
        .await
    {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!(file_id = file.id, error = %err, "failed to build thumbnail url");
            String::new()
        }
    };

    FileResponse {
        id: file.id,
        url,
        thumbnail,
        name: file.original_name.clone(),
        size: file.size,
        mime_type: file.mime_type.clone(),
    }
}

pub async fn responses(state: &AppState, files: &[file::Model]) -> Vec<FileResponse> {
    join_all(files.iter().map(|f| response(state, f))).await
}

pub async fn optional_response(state: &AppState, file: Option<&file::Model>) -> Option<FileResponse> {
    match file {
        Some(file) => Some(response(state, file).await),
        None => None,
    }
}

/// Reject ids that do not name a live file.
pub async fn require_files(state: &AppState, ids: &[i64]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }
    let existing = FileRepo::new(&state.db).existing_ids(ids).await?;
    if let Some(missing) = ids.iter().find(|id| !existing.contains(id)) {
        return Err(AppError::NotFound(format!("file {missing} not found")));
    }
    Ok(())
}
