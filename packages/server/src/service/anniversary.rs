use sea_orm::ActiveValue::Set;
use sea_orm::Order;

use crate::entity::anniversary;
use crate::error::AppError;
use crate::models::anniversary::*;
use crate::models::shared::{Pagination, required_text};
use crate::repo::{AnniversaryRepo, PageRequest, QueryOptions};
use crate::state::AppState;

/// Anniversaries in calendar order.
pub async fn list(state: &AppState, page: PageRequest) -> Result<AnniversaryListResponse, AppError> {
    let options = QueryOptions::new().order_by("date", Order::Asc);
    let (rows, total) = AnniversaryRepo::new(&state.db)
        .find_with_pagination(page, &options)
        .await?;
    Ok(AnniversaryListResponse {
        anniversaries: rows.into_iter().map(AnniversaryResponse::from).collect(),
        pagination: Pagination::new(page, total),
    })
}

pub async fn create(
    state: &AppState,
    payload: CreateAnniversaryRequest,
) -> Result<AnniversaryResponse, AppError> {
    let (title, date, calendar) = validate_create_anniversary(&payload)?;
    let created = AnniversaryRepo::new(&state.db)
        .create(anniversary::ActiveModel {
            title: Set(title),
            date: Set(date),
            description: Set(payload.description.trim().to_string()),
            calendar: Set(calendar),
            ..Default::default()
        })
        .await?;
    Ok(created.into())
}

/// Changing only the calendar re-validates the stored date against it.
pub async fn update(
    state: &AppState,
    anniversary_id: i64,
    payload: UpdateAnniversaryRequest,
) -> Result<AnniversaryResponse, AppError> {
    let repo = AnniversaryRepo::new(&state.db);
    let mut current = repo.find_by_id(anniversary_id, &QueryOptions::new()).await?;
    if let Some(title) = payload.title {
        current.title = required_text(&title, "title", 100)?;
    }
    if let Some(description) = payload.description {
        current.description = description.trim().to_string();
    }
    if let Some(calendar) = payload.calendar {
        current.calendar = calendar;
    }
    let date = payload.date.unwrap_or_else(|| current.date.clone());
    current.date = validate_anniversary_date(&date, current.calendar)?;
    Ok(repo.update(current).await?.into())
}

pub async fn delete(state: &AppState, anniversary_id: i64) -> Result<(), AppError> {
    AnniversaryRepo::new(&state.db)
        .delete_by_id(anniversary_id)
        .await?;
    Ok(())
}
