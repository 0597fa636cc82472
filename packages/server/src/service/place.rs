use futures::future::join_all;
use sea_orm::ActiveValue::Set;
use sea_orm::Order;

use super::file;
use crate::entity::place;
use crate::error::AppError;
use crate::models::place::*;
use crate::models::shared::{Pagination, required_text, validate_date};
use crate::repo::{PageRequest, PlaceLink, PlaceRepo, PlaceWithImage, QueryOptions};
use crate::state::AppState;

async fn place_response(state: &AppState, row: &PlaceWithImage) -> PlaceResponse {
    PlaceResponse {
        id: row.place.id,
        name: row.place.name.clone(),
        latitude: row.place.latitude,
        longitude: row.place.longitude,
        image: file::optional_response(state, row.image.as_ref()).await,
        description: row.place.description.clone(),
        date: row.place.date.clone(),
    }
}

async fn load(state: &AppState, place_id: i64) -> Result<PlaceResponse, AppError> {
    let row = PlaceRepo::new(&state.db)
        .find_by_id(place_id, &QueryOptions::new().preload(PlaceLink::Image))
        .await?;
    Ok(place_response(state, &row).await)
}

/// Most recent visits first.
pub async fn list(state: &AppState, page: PageRequest) -> Result<PlaceListResponse, AppError> {
    let options = QueryOptions::new()
        .order_by("date", Order::Desc)
        .preload(PlaceLink::Image);
    let (rows, total) = PlaceRepo::new(&state.db)
        .find_with_pagination(page, &options)
        .await?;
    Ok(PlaceListResponse {
        places: join_all(rows.iter().map(|row| place_response(state, row))).await,
        pagination: Pagination::new(page, total),
    })
}

pub async fn create(state: &AppState, payload: CreatePlaceRequest) -> Result<PlaceResponse, AppError> {
    let (name, date) = validate_create_place(&payload)?;
    if let Some(image_id) = payload.image_id {
        file::require_files(state, &[image_id]).await?;
    }
    let created = PlaceRepo::new(&state.db)
        .create_with_image(place::ActiveModel {
            name: Set(name),
            latitude: Set(payload.latitude),
            longitude: Set(payload.longitude),
            image_id: Set(payload.image_id),
            description: Set(payload.description.trim().to_string()),
            date: Set(date),
            ..Default::default()
        })
        .await?;
    tracing::info!(place_id = created.id, "place created");
    load(state, created.id).await
}

pub async fn update(
    state: &AppState,
    place_id: i64,
    payload: UpdatePlaceRequest,
) -> Result<PlaceResponse, AppError> {
    let repo = PlaceRepo::new(&state.db);
    let mut current = repo.find_by_id(place_id, &QueryOptions::new()).await?.place;
    if let Some(name) = payload.name {
        current.name = required_text(&name, "name", 100)?;
    }
    if let Some(latitude) = payload.latitude {
        current.latitude = latitude;
    }
    if let Some(longitude) = payload.longitude {
        current.longitude = longitude;
    }
    validate_coordinates(current.latitude, current.longitude)?;
    if let Some(description) = payload.description {
        current.description = description.trim().to_string();
    }
    if let Some(date) = payload.date {
        current.date = validate_date(&date, "date")?;
    }
    if let Some(image_id) = payload.image_id {
        if let Some(id) = image_id {
            file::require_files(state, &[id]).await?;
        }
        current.image_id = image_id;
    }
    repo.update_with_image(current).await?;
    load(state, place_id).await
}

pub async fn delete(state: &AppState, place_id: i64) -> Result<(), AppError> {
    PlaceRepo::new(&state.db).delete_with_image(place_id).await?;
    tracing::info!(place_id, "place deleted");
    Ok(())
}
