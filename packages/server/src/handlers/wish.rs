use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, OptionalAuthUser};
use crate::extractors::json::AppJson;
use crate::models::wish::{CreateWishRequest, WishListQuery, WishListResponse, WishResponse};
use crate::service::wish;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/wishes",
    tag = "Wishes",
    operation_id = "listWishes",
    summary = "List wishes",
    description = "Newest first. Anonymous viewers see approved wishes only; signed-in \
                   viewers see both, or one state with `approved`.",
    params(WishListQuery),
    responses(
        (status = 200, description = "Paginated wish list", body = WishListResponse),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_wishes(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Query(query): Query<WishListQuery>,
) -> Result<Json<WishListResponse>, AppError> {
    let approved = query.approved_filter(viewer.0.is_some());
    Ok(Json(
        wish::list(&state, approved, query.page_request()).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/wishes",
    tag = "Wishes",
    operation_id = "createWish",
    summary = "Leave a wish",
    description = "Open to visitors. The wish is hidden until approved.",
    request_body = CreateWishRequest,
    responses(
        (status = 201, description = "Wish submitted", body = WishResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_wish(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateWishRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = wish::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/wishes/{id}",
    tag = "Wishes",
    operation_id = "deleteWish",
    summary = "Delete a wish",
    params(("id" = i64, Path, description = "Wish ID")),
    responses(
        (status = 204, description = "Wish deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Wish not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(wish_id))]
pub async fn delete_wish(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(wish_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    wish::delete(&state, wish_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/wishes/{id}/approve",
    tag = "Wishes",
    operation_id = "approveWish",
    summary = "Approve a wish",
    params(("id" = i64, Path, description = "Wish ID")),
    responses(
        (status = 200, description = "Wish approved", body = WishResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Wish not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(wish_id))]
pub async fn approve_wish(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(wish_id): Path<i64>,
) -> Result<Json<WishResponse>, AppError> {
    Ok(Json(wish::approve(&state, wish_id).await?))
}
