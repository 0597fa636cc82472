use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub name: String,
    pub role: String,
}

/// Like [`AuthUser`] but never rejects: a missing or invalid token yields `None`.
///
/// Used by public listings that show more to signed-in users.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::TokenMissing)?;

    let (scheme, token) = auth_header
        .split_once(' ')
        .ok_or(AppError::TokenInvalid)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AppError::TokenInvalid);
    }
    Ok(token.trim())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = jwt::verify(&state.config.auth, token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AppError::TokenInvalid
        })?;

        Ok(AuthUser {
            user_id: claims.uid,
            name: claims.sub,
            role: claims.role,
        })
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
