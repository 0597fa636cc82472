use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::system::{
    DashboardStats, InitStatusResponse, InitSystemRequest, SiteSettings, SystemInfoResponse,
};
use crate::service::system;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/system/init",
    tag = "System",
    operation_id = "initSystem",
    summary = "Initialise the site",
    description = "Creates both accounts with one shared password and the base site settings. \
        Only allowed while no account exists.",
    request_body = InitSystemRequest,
    responses(
        (status = 201, description = "Site initialised", body = InitStatusResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Already initialised (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn init_system(
    State(state): State<AppState>,
    AppJson(payload): AppJson<InitSystemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = system::init(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

#[utoipa::path(
    get,
    path = "/system/init",
    tag = "System",
    operation_id = "getInitStatus",
    summary = "Check whether the site is initialised",
    responses(
        (status = 200, description = "Initialisation status", body = InitStatusResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn init_status(
    State(state): State<AppState>,
) -> Result<Json<InitStatusResponse>, AppError> {
    Ok(Json(system::init_status(&state).await?))
}

#[utoipa::path(
    get,
    path = "/system/info",
    tag = "System",
    operation_id = "getSystemInfo",
    summary = "Public site information",
    description = "Site title, description and start date plus both partners with their avatars.",
    responses(
        (status = 200, description = "Site information", body = SystemInfoResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn system_info(
    State(state): State<AppState>,
) -> Result<Json<SystemInfoResponse>, AppError> {
    Ok(Json(system::info(&state).await?))
}

#[utoipa::path(
    get,
    path = "/system/settings/site",
    tag = "System",
    operation_id = "getSiteSettings",
    summary = "Read the site settings",
    responses(
        (status = 200, description = "Key/value settings of the general group", body = BTreeMap<String, String>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_site_settings(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SiteSettings>, AppError> {
    Ok(Json(system::site_settings(&state).await?))
}

#[utoipa::path(
    post,
    path = "/system/settings/site",
    tag = "System",
    operation_id = "saveSiteSettings",
    summary = "Save the site settings",
    description = "Upserts every given key into the general group. `siteTitle` is required.",
    request_body = BTreeMap<String, String>,
    responses(
        (status = 200, description = "Settings after the save", body = BTreeMap<String, String>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload))]
pub async fn save_site_settings(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SiteSettings>,
) -> Result<Json<SiteSettings>, AppError> {
    Ok(Json(system::save_site_settings(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/system/dashboard/stats",
    tag = "System",
    operation_id = "getDashboardStats",
    summary = "Dashboard counters",
    responses(
        (status = 200, description = "Counts of live records", body = DashboardStats),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn dashboard_stats(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(system::dashboard(&state).await?))
}
