use sea_orm::ActiveValue::Set;
use sea_orm::Order;

use crate::entity::wish;
use crate::error::AppError;
use crate::models::shared::Pagination;
use crate::models::wish::*;
use crate::repo::{FilterCondition, PageRequest, QueryOptions, WishRepo};
use crate::state::AppState;

/// Newest first, narrowed to one approval state when `approved` is set.
pub async fn list(
    state: &AppState,
    approved: Option<bool>,
    page: PageRequest,
) -> Result<WishListResponse, AppError> {
    let mut options = QueryOptions::new().order_by("created_at", Order::Desc);
    if let Some(approved) = approved {
        options = options.filter(FilterCondition::eq("approved", approved));
    }
    let (rows, total) = WishRepo::new(&state.db)
        .find_with_pagination(page, &options)
        .await?;
    Ok(WishListResponse {
        wishes: rows.into_iter().map(WishResponse::from).collect(),
        pagination: Pagination::new(page, total),
    })
}

/// Anyone may leave a wish; it stays hidden until approved.
pub async fn create(state: &AppState, payload: CreateWishRequest) -> Result<WishResponse, AppError> {
    let (content, author_name, email) = validate_create_wish(&payload)?;
    let created = WishRepo::new(&state.db)
        .create(wish::ActiveModel {
            content: Set(content),
            author_name: Set(author_name),
            email: Set(email),
            approved: Set(false),
            ..Default::default()
        })
        .await?;
    tracing::info!(wish_id = created.id, "wish submitted");
    Ok(created.into())
}

pub async fn delete(state: &AppState, wish_id: i64) -> Result<(), AppError> {
    WishRepo::new(&state.db).delete_by_id(wish_id).await?;
    Ok(())
}

pub async fn approve(state: &AppState, wish_id: i64) -> Result<WishResponse, AppError> {
    let repo = WishRepo::new(&state.db);
    repo.approve(wish_id).await?;
    Ok(repo.find_by_id(wish_id, &QueryOptions::new()).await?.into())
}
