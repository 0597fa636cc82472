use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::anniversary::{
    AnniversaryListResponse, AnniversaryResponse, CreateAnniversaryRequest,
    UpdateAnniversaryRequest,
};
use crate::models::shared::PageQuery;
use crate::service::anniversary;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/anniversaries",
    tag = "Anniversaries",
    operation_id = "listAnniversaries",
    summary = "List anniversaries",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated anniversary list", body = AnniversaryListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_anniversaries(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AnniversaryListResponse>, AppError> {
    Ok(Json(anniversary::list(&state, query.page_request()).await?))
}

#[utoipa::path(
    post,
    path = "/anniversaries",
    tag = "Anniversaries",
    operation_id = "createAnniversary",
    summary = "Add an anniversary",
    description = "`calendar` defaults to `solar`. Lunar dates may use day 30 in any month.",
    request_body = CreateAnniversaryRequest,
    responses(
        (status = 201, description = "Anniversary created", body = AnniversaryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload))]
pub async fn create_anniversary(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAnniversaryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = anniversary::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/anniversaries/{id}",
    tag = "Anniversaries",
    operation_id = "updateAnniversary",
    summary = "Update an anniversary",
    params(("id" = i64, Path, description = "Anniversary ID")),
    request_body = UpdateAnniversaryRequest,
    responses(
        (status = 200, description = "Anniversary updated", body = AnniversaryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Anniversary not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(anniversary_id))]
pub async fn update_anniversary(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(anniversary_id): Path<i64>,
    AppJson(payload): AppJson<UpdateAnniversaryRequest>,
) -> Result<Json<AnniversaryResponse>, AppError> {
    Ok(Json(anniversary::update(&state, anniversary_id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/anniversaries/{id}",
    tag = "Anniversaries",
    operation_id = "deleteAnniversary",
    summary = "Delete an anniversary",
    params(("id" = i64, Path, description = "Anniversary ID")),
    responses(
        (status = 204, description = "Anniversary deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Anniversary not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(anniversary_id))]
pub async fn delete_anniversary(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(anniversary_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    anniversary::delete(&state, anniversary_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
