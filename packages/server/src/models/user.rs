use serde::{Deserialize, Serialize};

use super::shared::{FileResponse, Pagination, double_option};
use crate::entity::user::Role;
use crate::error::AppError;

/// Request body for `POST /user/token`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Email address or user name.
    #[schema(example = "ann")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    #[schema(example = 900)]
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub phone: String,
    /// Account creation date, `YYYY-MM-DD`.
    pub join_date: String,
    pub avatar: Option<FileResponse>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: String,
    /// Empty clears the email.
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    /// Absent keeps the avatar, `null` removes it.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub avatar_id: Option<Option<i64>>,
    /// New password; empty keeps the current one.
    #[serde(default)]
    pub new_password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarHistoryItem {
    pub id: i64,
    pub url: String,
    pub thumbnail_url: String,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarHistoryResponse {
    pub avatars: Vec<AvatarHistoryItem>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<Option<String>, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(None);
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(Some(email.to_string()))
        }
        _ => Err(AppError::Validation("email is not valid".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_optional_but_checked() {
        assert_eq!(validate_email("  ").unwrap(), None);
        assert_eq!(validate_email("a@b.cn").unwrap().as_deref(), Some("a@b.cn"));
        assert!(validate_email("nobody").is_err());
        assert!(validate_email("@b.cn").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }
}
