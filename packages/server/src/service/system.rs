//! First-run initialisation, public site info, site settings and dashboard
//! counters.

use sea_orm::ActiveValue::Set;
use sea_orm::TransactionTrait;

use super::file;
use crate::entity::user::{self, Role};
use crate::error::AppError;
use crate::models::shared::validate_date;
use crate::models::system::*;
use crate::models::user::validate_email;
use crate::repo::{
    AlbumRepo, FilterCondition, MomentRepo, PlaceRepo, QueryOptions, SettingInput, SettingRepo,
    UserRepo, UserWithAvatar, WishRepo,
};
use crate::state::AppState;
use crate::utils::password;

pub const GENERAL_GROUP: &str = "general";
pub const SITE_TITLE: &str = "siteTitle";
pub const SITE_DESCRIPTION: &str = "siteDescription";
pub const START_DATE: &str = "startDate";

fn setting(key: &str, value: String, kind: &str, label: &str) -> SettingInput {
    SettingInput {
        key: key.to_string(),
        value,
        kind: kind.to_string(),
        label: label.to_string(),
        group: GENERAL_GROUP.to_string(),
    }
}

/// The site counts as initialised once any account exists.
pub async fn is_initialized(state: &AppState) -> Result<bool, AppError> {
    Ok(UserRepo::new(&state.db).count(&QueryOptions::new()).await? > 0)
}

pub async fn init_status(state: &AppState) -> Result<InitStatusResponse, AppError> {
    Ok(InitStatusResponse {
        initialized: is_initialized(state).await?,
    })
}

/// Create both accounts and the base site settings in one transaction.
pub async fn init(state: &AppState, payload: InitSystemRequest) -> Result<InitStatusResponse, AppError> {
    validate_init_request(&payload)?;
    if is_initialized(state).await? {
        return Err(AppError::Conflict("system is already initialized".into()));
    }

    let hashed = password::hash(&payload.site_password)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;

    let txn = state.db.begin().await?;
    let users = UserRepo::new(&txn);
    if users.count(&QueryOptions::new()).await? > 0 {
        return Err(AppError::Conflict("system is already initialized".into()));
    }
    let accounts = [
        (
            &payload.user_a_name,
            payload.user_a_role,
            &payload.user_a_email,
            &payload.user_a_phone,
        ),
        (
            &payload.user_b_name,
            payload.user_b_role,
            &payload.user_b_email,
            &payload.user_b_phone,
        ),
    ];
    for (name, role, email, phone) in accounts {
        users
            .create(user::ActiveModel {
                name: Set(name.trim().to_string()),
                email: Set(validate_email(email)?),
                password: Set(hashed.clone()),
                role: Set(role),
                phone: Set(phone.trim().to_string()),
                avatar_id: Set(None),
                ..Default::default()
            })
            .await?;
    }

    let settings = SettingRepo::new(&txn);
    for input in [
        setting(SITE_TITLE, payload.site_name.trim().to_string(), "text", "Site title"),
        setting(
            SITE_DESCRIPTION,
            payload.site_description.trim().to_string(),
            "textarea",
            "Site description",
        ),
        setting(START_DATE, payload.start_date.trim().to_string(), "date", "Start date"),
    ] {
        settings.upsert(input).await?;
    }
    txn.commit().await?;

    tracing::info!(site = payload.site_name.trim(), "system initialized");
    Ok(InitStatusResponse { initialized: true })
}

async fn partner(state: &AppState, row: Option<UserWithAvatar>) -> PartnerInfo {
    match row {
        Some(row) => PartnerInfo {
            name: row.user.name,
            avatar: file::optional_response(state, row.avatar.as_ref()).await,
        },
        None => PartnerInfo::default(),
    }
}

/// Public landing-page data.
pub async fn info(state: &AppState) -> Result<SystemInfoResponse, AppError> {
    let settings = site_settings(state).await?;
    let value = |key: &str| settings.get(key).cloned().unwrap_or_default();

    let users = UserRepo::new(&state.db);
    let boy = users.find_by_role(Role::Boy).await?;
    let girl = users.find_by_role(Role::Girl).await?;

    Ok(SystemInfoResponse {
        site: SiteInfo {
            name: value(SITE_TITLE),
            description: value(SITE_DESCRIPTION),
            start_date: value(START_DATE),
        },
        couple: CoupleInfo {
            boy: partner(state, boy).await,
            girl: partner(state, girl).await,
        },
    })
}

pub async fn site_settings(state: &AppState) -> Result<SiteSettings, AppError> {
    Ok(SettingRepo::new(&state.db)
        .list_by_group(GENERAL_GROUP)
        .await?
        .into_iter()
        .map(|row| (row.key, row.value))
        .collect())
}

/// Upsert every given key into the `general` group. Kinds and labels of
/// existing keys are preserved.
pub async fn save_site_settings(
    state: &AppState,
    payload: SiteSettings,
) -> Result<SiteSettings, AppError> {
    match payload.get(SITE_TITLE) {
        Some(title) if !title.trim().is_empty() => {}
        _ => return Err(AppError::Validation("siteTitle is required".into())),
    }
    if let Some(date) = payload.get(START_DATE).filter(|d| !d.trim().is_empty()) {
        validate_date(date, START_DATE)?;
    }

    let txn = state.db.begin().await?;
    let repo = SettingRepo::new(&txn);
    for (key, value) in payload {
        let (kind, label) = match repo.find_by_key(&key).await? {
            Some(existing) => (existing.kind, existing.label),
            None => ("text".to_string(), key.clone()),
        };
        repo.upsert(SettingInput {
            key,
            value: value.trim().to_string(),
            kind,
            label,
            group: GENERAL_GROUP.to_string(),
        })
        .await?;
    }
    txn.commit().await?;

    site_settings(state).await
}

pub async fn dashboard(state: &AppState) -> Result<DashboardStats, AppError> {
    let albums = AlbumRepo::new(&state.db);
    let wishes = WishRepo::new(&state.db);
    Ok(DashboardStats {
        album_stats: AlbumStats {
            total: albums.count(&QueryOptions::new()).await?,
            total_photos: albums.total_photos().await?,
        },
        place_stats: CountStats {
            total: PlaceRepo::new(&state.db).count(&QueryOptions::new()).await?,
        },
        moment_stats: CountStats {
            total: MomentRepo::new(&state.db).count_where(&[]).await?,
        },
        wish_stats: WishStats {
            total: wishes.count_where(&[]).await?,
            pending: wishes
                .count_where(&[FilterCondition::eq("approved", false)])
                .await?,
        },
    })
}
