use futures::future::join_all;
use sea_orm::ActiveValue::Set;
use sea_orm::Order;

use super::file;
use crate::entity::album;
use crate::entity::entity_file::EntityType;
use crate::error::AppError;
use crate::models::album::*;
use crate::models::shared::{Pagination, required_text};
use crate::repo::{AlbumLink, AlbumRepo, AlbumWithFiles, EntityFileRepo, PageRequest, QueryOptions};
use crate::state::AppState;

/// Photos accepted by one append or replace request.
pub const MAX_PHOTOS_PER_REQUEST: usize = 500;

async fn album_response(state: &AppState, row: &AlbumWithFiles) -> AlbumResponse {
    AlbumResponse {
        id: row.album.id,
        name: row.album.name.clone(),
        description: row.album.description.clone(),
        cover_image: file::optional_response(state, row.cover_image.as_ref()).await,
        photo_count: row.album.photo_count,
        created_at: row.album.created_at.format("%Y-%m-%d").to_string(),
    }
}

async fn load(state: &AppState, album_id: i64) -> Result<AlbumResponse, AppError> {
    let row = AlbumRepo::new(&state.db)
        .find_by_id(album_id, &QueryOptions::new().preload(AlbumLink::CoverImage))
        .await?;
    Ok(album_response(state, &row).await)
}

/// Newest albums first, each with its cover.
pub async fn list(state: &AppState, page: PageRequest) -> Result<AlbumListResponse, AppError> {
    let options = QueryOptions::new()
        .order_by("created_at", Order::Desc)
        .preload(AlbumLink::CoverImage);
    let (rows, total) = AlbumRepo::new(&state.db)
        .find_with_pagination(page, &options)
        .await?;
    Ok(AlbumListResponse {
        albums: join_all(rows.iter().map(|row| album_response(state, row))).await,
        pagination: Pagination::new(page, total),
    })
}

pub async fn create(state: &AppState, payload: CreateAlbumRequest) -> Result<AlbumResponse, AppError> {
    let name = validate_create_album(&payload)?;
    let created = AlbumRepo::new(&state.db)
        .create(album::ActiveModel {
            name: Set(name),
            description: Set(payload.description.trim().to_string()),
            photo_count: Set(0),
            cover_image_id: Set(None),
            ..Default::default()
        })
        .await?;
    tracing::info!(album_id = created.id, "album created");
    load(state, created.id).await
}

pub async fn update(
    state: &AppState,
    album_id: i64,
    payload: UpdateAlbumRequest,
) -> Result<AlbumResponse, AppError> {
    let name = payload
        .name
        .map(|name| required_text(&name, "name", MAX_NAME_LEN))
        .transpose()?;
    let description = payload.description.map(|d| d.trim().to_string());
    AlbumRepo::new(&state.db)
        .update_details(album_id, name, description)
        .await?;
    load(state, album_id).await
}

/// Only empty albums can be deleted.
pub async fn delete(state: &AppState, album_id: i64) -> Result<(), AppError> {
    AlbumRepo::new(&state.db).delete_empty(album_id).await?;
    tracing::info!(album_id, "album deleted");
    Ok(())
}

pub async fn photos(
    state: &AppState,
    album_id: i64,
    page: PageRequest,
) -> Result<AlbumPhotoListResponse, AppError> {
    AlbumRepo::new(&state.db)
        .find_by_id(album_id, &QueryOptions::new())
        .await?;
    let (files, total) = EntityFileRepo::new(&state.db)
        .associated_files_paginated(album_id, EntityType::Album, page, &QueryOptions::new())
        .await?;
    let views = file::responses(state, &files).await;
    let photos = files
        .iter()
        .zip(views)
        .map(|(model, view)| AlbumPhotoResponse {
            album_id,
            file: view,
            alt: model.original_name.clone(),
            created_at: model.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();
    Ok(AlbumPhotoListResponse {
        photos,
        pagination: Pagination::new(page, total),
    })
}

/// Add photos, skipping those already in the album.
pub async fn append_photos(
    state: &AppState,
    album_id: i64,
    payload: AlbumPhotosRequest,
) -> Result<AlbumResponse, AppError> {
    validate_photo_ids(&payload.photo_ids, MAX_PHOTOS_PER_REQUEST)?;
    if payload.photo_ids.is_empty() {
        return Err(AppError::Validation("photoIds must not be empty".into()));
    }
    file::require_files(state, &payload.photo_ids).await?;
    let updated = AlbumRepo::new(&state.db)
        .append_photos(album_id, &payload.photo_ids)
        .await?;
    tracing::info!(album_id, photo_count = updated.photo_count, "photos appended");
    load(state, album_id).await
}

/// Make the album hold exactly the given photos.
pub async fn replace_photos(
    state: &AppState,
    album_id: i64,
    payload: AlbumPhotosRequest,
) -> Result<AlbumResponse, AppError> {
    validate_photo_ids(&payload.photo_ids, MAX_PHOTOS_PER_REQUEST)?;
    file::require_files(state, &payload.photo_ids).await?;
    let updated = AlbumRepo::new(&state.db)
        .replace_photos(album_id, &payload.photo_ids)
        .await?;
    tracing::info!(album_id, photo_count = updated.photo_count, "photos replaced");
    load(state, album_id).await
}

pub async fn remove_photo(
    state: &AppState,
    album_id: i64,
    photo_id: i64,
) -> Result<AlbumResponse, AppError> {
    AlbumRepo::new(&state.db)
        .remove_photo(album_id, photo_id)
        .await?;
    load(state, album_id).await
}

/// Point the cover at one of the album's photos, or clear it.
pub async fn set_cover(
    state: &AppState,
    album_id: i64,
    payload: SetCoverRequest,
) -> Result<AlbumResponse, AppError> {
    AlbumRepo::new(&state.db)
        .set_cover(album_id, payload.photo_id)
        .await?;
    load(state, album_id).await
}
