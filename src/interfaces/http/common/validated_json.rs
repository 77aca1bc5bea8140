//! JSON extractor that runs `validator` checks
//!
//! Malformed bodies are rejected with 400, bodies failing their
//! `#[validate]` rules with 422 and a `field: message` list.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ApiResponse;

/// `axum::Json<T>` plus `Validate::validate()`.
///
/// ```ignore
/// async fn create_card(ValidatedJson(body): ValidatedJson<CreateCardRequest>) { ... }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    JsonError(JsonRejection),
    ValidationError(validator::ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(rejection) => {
                let body = ApiResponse::<()>::error(format!("Malformed request body: {}", rejection));
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::ValidationError(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            let msg = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("{:?}", e.code));
                            format!("{}: {}", field, msg)
                        })
                    })
                    .collect();

                let message = if field_errors.is_empty() {
                    "ValidationError".to_string()
                } else {
                    format!("ValidationError: {}", field_errors.join("; "))
                };

                let body = ApiResponse::<()>::error(message);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct PlateBody {
        #[validate(length(min = 1, max = 20, message = "plate is required"))]
        plate: String,
        #[validate(range(min = 1900, max = 2100))]
        year: i32,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<PlateBody>) -> &'static str {
        "ok"
    }

    async fn send(body: Body) -> axum::http::Response<Body> {
        let app = Router::new().route("/vehicles", post(handler));
        let req = Request::builder()
            .method("POST")
            .uri("/vehicles")
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        app.oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let body = serde_json::json!({"plate": "AB-123", "year": 2020});
        let resp = send(Body::from(serde_json::to_vec(&body).unwrap())).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let resp = send(Body::from("{plate")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn failed_rules_are_422_with_messages() {
        let body = serde_json::json!({"plate": "", "year": 1800});
        let resp = send(Body::from(serde_json::to_vec(&body).unwrap())).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let envelope: ApiResponse<()> = serde_json::from_slice(&bytes).unwrap();
        let error = envelope.error.unwrap();
        assert!(error.contains("plate: plate is required"));
        assert!(error.contains("year"));
    }
}
