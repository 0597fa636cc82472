use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::PageQuery;
use crate::models::user::{
    AvatarHistoryResponse, LoginRequest, LoginResponse, UpdateUserRequest, UserResponse,
};
use crate::service::user;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/user/token",
    tag = "Users",
    operation_id = "login",
    summary = "Log in",
    description = "Authenticates by email or user name and returns a JWT bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(user::login(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/user",
    tag = "Users",
    operation_id = "getCurrentUser",
    summary = "Get current user profile",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(user::me(&state, auth_user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List both accounts",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_users(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(user::list(&state).await?))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user profile",
    description = "Either partner may edit either profile. A changed `avatarId` moves the avatar \
        association; a non-empty `newPassword` replaces the password.",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User or avatar file not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id, editor = auth_user.user_id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(user::update(&state, user_id, payload).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}/avatars",
    tag = "Users",
    operation_id = "listUserAvatars",
    summary = "List a user's avatar history",
    params(("id" = i64, Path, description = "User ID"), PageQuery),
    responses(
        (status = 200, description = "Paginated avatar history", body = AvatarHistoryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query), fields(user_id))]
pub async fn list_user_avatars(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AvatarHistoryResponse>, AppError> {
    Ok(Json(
        user::avatar_history(&state, user_id, query.page_request()).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/users/{id}/avatars/{file_id}",
    tag = "Users",
    operation_id = "removeUserAvatar",
    summary = "Remove an avatar from the history",
    description = "Clears the current avatar when it is the removed file. The file is kept.",
    params(
        ("id" = i64, Path, description = "User ID"),
        ("file_id" = i64, Path, description = "File ID"),
    ),
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(user_id, file_id))]
pub async fn remove_user_avatar(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((user_id, file_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    user::remove_avatar(&state, user_id, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
