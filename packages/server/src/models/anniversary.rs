use serde::{Deserialize, Serialize};

use super::shared::{Pagination, required_text, validate_date};
use crate::entity::anniversary::{self, Calendar};
use crate::error::AppError;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnniversaryResponse {
    pub id: i64,
    #[schema(example = "First date")]
    pub title: String,
    /// `YYYY-MM-DD` in `calendar`.
    #[schema(example = "2019-05-20")]
    pub date: String,
    pub description: String,
    pub calendar: Calendar,
}

impl From<anniversary::Model> for AnniversaryResponse {
    fn from(model: anniversary::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            date: model.date,
            description: model.description,
            calendar: model.calendar,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnniversaryListResponse {
    pub anniversaries: Vec<AnniversaryResponse>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnniversaryRequest {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to `solar`.
    pub calendar: Option<Calendar>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnniversaryRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub calendar: Option<Calendar>,
}

/// Solar dates must exist in the Gregorian calendar. Lunar dates only need
/// the `YYYY-MM-DD` shape, since a lunar month may have a 30th day that the
/// same solar month lacks.
pub fn validate_anniversary_date(date: &str, calendar: Calendar) -> Result<String, AppError> {
    match calendar {
        Calendar::Solar => validate_date(date, "date"),
        Calendar::Lunar => {
            let date = date.trim();
            let parts: Vec<&str> = date.split('-').collect();
            let shaped = matches!(parts.as_slice(), [y, m, d]
                if y.len() == 4 && m.len() == 2 && d.len() == 2
                    && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
            let in_range = shaped
                && matches!(parts[1].parse::<u32>(), Ok(1..=12))
                && matches!(parts[2].parse::<u32>(), Ok(1..=30));
            if !in_range {
                return Err(AppError::Validation(
                    "date must be a YYYY-MM-DD date".into(),
                ));
            }
            Ok(date.to_string())
        }
    }
}

pub fn validate_create_anniversary(
    payload: &CreateAnniversaryRequest,
) -> Result<(String, String, Calendar), AppError> {
    let calendar = payload.calendar.unwrap_or(Calendar::Solar);
    Ok((
        required_text(&payload.title, "title", 100)?,
        validate_anniversary_date(&payload.date, calendar)?,
        calendar,
    ))
}
