use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, OptionalAuthUser};
use crate::extractors::json::AppJson;
use crate::models::moment::{
    CreateMomentRequest, MomentLikeResponse, MomentListResponse, MomentResponse,
    MomentVisibilityRequest, UpdateMomentRequest,
};
use crate::models::shared::PageQuery;
use crate::service::moment;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/moments",
    tag = "Moments",
    operation_id = "listMoments",
    summary = "List moments",
    description = "Newest first. Anonymous callers see public moments only; a signed-in user \
        sees their own moments, public or not.",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated moment list", body = MomentListResponse),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_moments(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MomentListResponse>, AppError> {
    Ok(Json(
        moment::list(&state, viewer.0.as_ref(), query.page_request()).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/moments",
    tag = "Moments",
    operation_id = "createMoment",
    summary = "Post a moment",
    request_body = CreateMomentRequest,
    responses(
        (status = 201, description = "Moment created", body = MomentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Image file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_moment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMomentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = moment::create(&state, &auth_user, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/moments/{id}",
    tag = "Moments",
    operation_id = "updateMoment",
    summary = "Edit a moment",
    description = "Partial update. `imageIds`, when present, replaces the whole image set.",
    params(("id" = i64, Path, description = "Moment ID")),
    request_body = UpdateMomentRequest,
    responses(
        (status = 200, description = "Moment updated", body = MomentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Moment or image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(moment_id))]
pub async fn update_moment(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(moment_id): Path<i64>,
    AppJson(payload): AppJson<UpdateMomentRequest>,
) -> Result<Json<MomentResponse>, AppError> {
    Ok(Json(moment::update(&state, moment_id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/moments/{id}",
    tag = "Moments",
    operation_id = "deleteMoment",
    summary = "Delete a moment",
    description = "Soft-deletes the moment and detaches its images. The image files are kept.",
    params(("id" = i64, Path, description = "Moment ID")),
    responses(
        (status = 204, description = "Moment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Moment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(moment_id))]
pub async fn delete_moment(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(moment_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    moment::delete(&state, moment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/moments/{id}/public",
    tag = "Moments",
    operation_id = "setMomentVisibility",
    summary = "Publish or hide a moment",
    params(("id" = i64, Path, description = "Moment ID")),
    request_body = MomentVisibilityRequest,
    responses(
        (status = 200, description = "Moment with the new visibility", body = MomentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Moment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(moment_id))]
pub async fn set_moment_visibility(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(moment_id): Path<i64>,
    AppJson(payload): AppJson<MomentVisibilityRequest>,
) -> Result<Json<MomentResponse>, AppError> {
    Ok(Json(moment::set_public(&state, moment_id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/moments/{id}/like",
    tag = "Moments",
    operation_id = "likeMoment",
    summary = "Like a moment",
    description = "Atomically increments the like counter. Anyone may like.",
    params(("id" = i64, Path, description = "Moment ID")),
    responses(
        (status = 200, description = "Like count after the increment", body = MomentLikeResponse),
        (status = 404, description = "Moment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(moment_id))]
pub async fn like_moment(
    State(state): State<AppState>,
    Path(moment_id): Path<i64>,
) -> Result<Json<MomentLikeResponse>, AppError> {
    Ok(Json(moment::like(&state, moment_id).await?))
}
