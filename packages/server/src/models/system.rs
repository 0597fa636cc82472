use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::shared::{FileResponse, required_text, validate_date};
use super::user::{validate_email, validate_password};
use crate::entity::user::Role;
use crate::error::AppError;

/// Request body for `POST /system/init`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitSystemRequest {
    #[schema(example = "Our Little Story")]
    pub site_name: String,
    #[serde(default)]
    pub site_description: String,
    /// `YYYY-MM-DD` the story began.
    #[schema(example = "2019-05-20")]
    pub start_date: String,
    pub user_a_name: String,
    pub user_a_role: Role,
    #[serde(default)]
    pub user_a_email: String,
    #[serde(default)]
    pub user_a_phone: String,
    pub user_b_name: String,
    pub user_b_role: Role,
    #[serde(default)]
    pub user_b_email: String,
    #[serde(default)]
    pub user_b_phone: String,
    /// Shared password of both accounts.
    pub site_password: String,
    pub site_password_confirm: String,
}

pub fn validate_init_request(payload: &InitSystemRequest) -> Result<(), AppError> {
    required_text(&payload.site_name, "siteName", 100)?;
    validate_date(&payload.start_date, "startDate")?;
    required_text(&payload.user_a_name, "userAName", 50)?;
    required_text(&payload.user_b_name, "userBName", 50)?;
    if payload.user_a_name.trim() == payload.user_b_name.trim() {
        return Err(AppError::Validation("user names must differ".into()));
    }
    if payload.user_a_role == payload.user_b_role {
        return Err(AppError::Validation(
            "the two users must have different roles".into(),
        ));
    }
    validate_email(&payload.user_a_email)?;
    validate_email(&payload.user_b_email)?;
    validate_password(&payload.site_password)?;
    if payload.site_password != payload.site_password_confirm {
        return Err(AppError::Validation("passwords do not match".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitStatusResponse {
    pub initialized: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    pub start_date: String,
}

#[derive(Serialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInfo {
    pub name: String,
    pub avatar: Option<FileResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoupleInfo {
    pub boy: PartnerInfo,
    pub girl: PartnerInfo,
}

/// Response for `GET /system/info`.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoResponse {
    pub site: SiteInfo,
    pub couple: CoupleInfo,
}

/// Key/value settings of the `general` group.
pub type SiteSettings = BTreeMap<String, String>;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumStats {
    pub total: u64,
    pub total_photos: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountStats {
    pub total: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishStats {
    pub total: u64,
    pub pending: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub album_stats: AlbumStats,
    pub place_stats: CountStats,
    pub moment_stats: CountStats,
    pub wish_stats: WishStats,
}
