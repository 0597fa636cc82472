use serde::{Deserialize, Serialize};

use super::shared::{FileResponse, Pagination, double_option, required_text, validate_date};
use crate::error::AppError;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    pub id: i64,
    #[schema(example = "Xiamen")]
    pub name: String,
    #[schema(example = 24.48)]
    pub latitude: f64,
    #[schema(example = 118.09)]
    pub longitude: f64,
    pub image: Option<FileResponse>,
    pub description: String,
    /// Visit date, `YYYY-MM-DD`.
    pub date: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceListResponse {
    pub places: Vec<PlaceResponse>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaceRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: String,
    pub date: String,
    pub image_id: Option<i64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaceRequest {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub date: Option<String>,
    /// Absent keeps the image, `null` removes it.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub image_id: Option<Option<i64>>,
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::Validation(
            "latitude must be between -90 and 90".into(),
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::Validation(
            "longitude must be between -180 and 180".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_place(payload: &CreatePlaceRequest) -> Result<(String, String), AppError> {
    let name = required_text(&payload.name, "name", 100)?;
    validate_coordinates(payload.latitude, payload.longitude)?;
    let date = validate_date(&payload.date, "date")?;
    Ok((name, date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_range_checked() {
        assert!(validate_coordinates(24.4, 118.1).is_ok());
        assert!(validate_coordinates(90.5, 0.0).is_err());
        assert!(validate_coordinates(0.0, -180.5).is_err());
    }

    #[test]
    fn image_id_distinguishes_absent_from_null() {
        let absent: UpdatePlaceRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.image_id, None);
        let cleared: UpdatePlaceRequest = serde_json::from_str(r#"{"imageId":null}"#).unwrap();
        assert_eq!(cleared.image_id, Some(None));
        let set: UpdatePlaceRequest = serde_json::from_str(r#"{"imageId":7}"#).unwrap();
        assert_eq!(set.image_id, Some(Some(7)));
    }
}
