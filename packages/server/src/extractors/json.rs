use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `Json<T>` whose rejections surface as `VALIDATION_ERROR` bodies.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError::Validation(rejection_message(&rejection))),
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "expected an application/json request body".into()
        }
        JsonRejection::JsonSyntaxError(_) => format!("malformed JSON: {}", rejection.body_text()),
        other => other.body_text(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn accepts_well_formed_json() {
        let AppJson(payload) =
            AppJson::<Payload>::from_request(request(Some("application/json"), r#"{"name":"ann"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "ann");
    }

    #[tokio::test]
    async fn missing_content_type_is_a_validation_error() {
        let err = AppJson::<Payload>::from_request(request(None, r#"{"name":"ann"}"#), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("application/json")));
    }

    #[tokio::test]
    async fn syntax_errors_are_reported() {
        let err = AppJson::<Payload>::from_request(request(Some("application/json"), "{"), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(msg) if msg.starts_with("malformed JSON")));
    }
}
