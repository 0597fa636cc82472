use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::place::{
    CreatePlaceRequest, PlaceListResponse, PlaceResponse, UpdatePlaceRequest,
};
use crate::models::shared::PageQuery;
use crate::service::place;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/places",
    tag = "Places",
    operation_id = "listPlaces",
    summary = "List visited places",
    description = "Most recent visit first.",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated place list", body = PlaceListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_places(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PlaceListResponse>, AppError> {
    Ok(Json(place::list(&state, query.page_request()).await?))
}

#[utoipa::path(
    post,
    path = "/places",
    tag = "Places",
    operation_id = "createPlace",
    summary = "Record a place",
    request_body = CreatePlaceRequest,
    responses(
        (status = 201, description = "Place created", body = PlaceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Image file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload))]
pub async fn create_place(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePlaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = place::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/places/{id}",
    tag = "Places",
    operation_id = "updatePlace",
    summary = "Update a place",
    description = "Partial update. `imageId: null` removes the image; omitting it keeps it.",
    params(("id" = i64, Path, description = "Place ID")),
    request_body = UpdatePlaceRequest,
    responses(
        (status = 200, description = "Place updated", body = PlaceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Place or image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(place_id))]
pub async fn update_place(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(place_id): Path<i64>,
    AppJson(payload): AppJson<UpdatePlaceRequest>,
) -> Result<Json<PlaceResponse>, AppError> {
    Ok(Json(place::update(&state, place_id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/places/{id}",
    tag = "Places",
    operation_id = "deletePlace",
    summary = "Delete a place",
    params(("id" = i64, Path, description = "Place ID")),
    responses(
        (status = 204, description = "Place deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Place not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(place_id))]
pub async fn delete_place(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(place_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    place::delete(&state, place_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
