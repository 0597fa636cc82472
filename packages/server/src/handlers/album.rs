use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::album::{
    AlbumListResponse, AlbumPhotoListResponse, AlbumPhotosRequest, AlbumResponse,
    CreateAlbumRequest, SetCoverRequest, UpdateAlbumRequest,
};
use crate::models::shared::PageQuery;
use crate::service::album;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/albums",
    tag = "Albums",
    operation_id = "listAlbums",
    summary = "List albums",
    description = "Newest albums first, each with its cover image.",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated album list", body = AlbumListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_albums(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AlbumListResponse>, AppError> {
    Ok(Json(album::list(&state, query.page_request()).await?))
}

#[utoipa::path(
    post,
    path = "/albums",
    tag = "Albums",
    operation_id = "createAlbum",
    summary = "Create an album",
    request_body = CreateAlbumRequest,
    responses(
        (status = 201, description = "Album created", body = AlbumResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload))]
pub async fn create_album(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAlbumRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = album::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/albums/{id}",
    tag = "Albums",
    operation_id = "updateAlbum",
    summary = "Update an album",
    description = "Partial update: omitted fields keep their current value.",
    params(("id" = i64, Path, description = "Album ID")),
    request_body = UpdateAlbumRequest,
    responses(
        (status = 200, description = "Album updated", body = AlbumResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Album not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(album_id))]
pub async fn update_album(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<i64>,
    AppJson(payload): AppJson<UpdateAlbumRequest>,
) -> Result<Json<AlbumResponse>, AppError> {
    Ok(Json(album::update(&state, album_id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/albums/{id}",
    tag = "Albums",
    operation_id = "deleteAlbum",
    summary = "Delete an album",
    description = "Only empty albums can be deleted. Remove the photos first.",
    params(("id" = i64, Path, description = "Album ID")),
    responses(
        (status = 204, description = "Album deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Album not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Album still has photos (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(album_id))]
pub async fn delete_album(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    album::delete(&state, album_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/albums/{id}/photos",
    tag = "Albums",
    operation_id = "listAlbumPhotos",
    summary = "List the photos of an album",
    description = "Photos in the order they were added.",
    params(("id" = i64, Path, description = "Album ID"), PageQuery),
    responses(
        (status = 200, description = "Paginated photo list", body = AlbumPhotoListResponse),
        (status = 404, description = "Album not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(album_id))]
pub async fn list_album_photos(
    State(state): State<AppState>,
    Path(album_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AlbumPhotoListResponse>, AppError> {
    Ok(Json(album::photos(&state, album_id, query.page_request()).await?))
}

#[utoipa::path(
    post,
    path = "/albums/{id}/photos",
    tag = "Albums",
    operation_id = "appendAlbumPhotos",
    summary = "Add photos to an album",
    description = "Appends the given files. Files already in the album are skipped.",
    params(("id" = i64, Path, description = "Album ID")),
    request_body = AlbumPhotosRequest,
    responses(
        (status = 200, description = "Album after the append", body = AlbumResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Album or file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(album_id))]
pub async fn append_album_photos(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<i64>,
    AppJson(payload): AppJson<AlbumPhotosRequest>,
) -> Result<Json<AlbumResponse>, AppError> {
    Ok(Json(album::append_photos(&state, album_id, payload).await?))
}

#[utoipa::path(
    put,
    path = "/albums/{id}/photos",
    tag = "Albums",
    operation_id = "replaceAlbumPhotos",
    summary = "Replace the photos of an album",
    description = "The album ends up holding exactly the given files. A cover that is no longer \
        among them is cleared.",
    params(("id" = i64, Path, description = "Album ID")),
    request_body = AlbumPhotosRequest,
    responses(
        (status = 200, description = "Album after the replace", body = AlbumResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Album or file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(album_id))]
pub async fn replace_album_photos(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<i64>,
    AppJson(payload): AppJson<AlbumPhotosRequest>,
) -> Result<Json<AlbumResponse>, AppError> {
    Ok(Json(album::replace_photos(&state, album_id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/albums/{id}/photos/{photo_id}",
    tag = "Albums",
    operation_id = "removeAlbumPhoto",
    summary = "Remove a photo from an album",
    description = "The file itself is kept. Removing a photo that is not in the album is a no-op.",
    params(
        ("id" = i64, Path, description = "Album ID"),
        ("photo_id" = i64, Path, description = "File ID"),
    ),
    responses(
        (status = 200, description = "Album after the removal", body = AlbumResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Album not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(album_id, photo_id))]
pub async fn remove_album_photo(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((album_id, photo_id)): Path<(i64, i64)>,
) -> Result<Json<AlbumResponse>, AppError> {
    Ok(Json(album::remove_photo(&state, album_id, photo_id).await?))
}

#[utoipa::path(
    put,
    path = "/albums/{id}/cover",
    tag = "Albums",
    operation_id = "setAlbumCover",
    summary = "Set or clear the album cover",
    params(("id" = i64, Path, description = "Album ID")),
    request_body = SetCoverRequest,
    responses(
        (status = 200, description = "Album with the new cover", body = AlbumResponse),
        (status = 400, description = "Photo is not in the album (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Album not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(album_id))]
pub async fn set_album_cover(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<i64>,
    AppJson(payload): AppJson<SetCoverRequest>,
) -> Result<Json<AlbumResponse>, AppError> {
    Ok(Json(album::set_cover(&state, album_id, payload).await?))
}
