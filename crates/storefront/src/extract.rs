//! Request body extraction.
//!
//! [`ApiJson`] replaces `axum::Json` on the way in so a body that fails to
//! parse answers with the same `{"error": ...}` shape and 400 status as every
//! other client error. Responses keep using `axum::Json`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body whose rejection is an [`AppError::BadRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                // Serde detail names fields and types; keep it out of the response
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(AppError::BadRequest(rejection_message(&rejection).to_owned()))
            }
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON",
        _ => "Invalid request body",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct StatusUpdate {
        status: String,
    }

    fn json_request(content_type: &str, body: &str) -> Request {
        Request::builder()
            .method("PATCH")
            .uri("/api/admin/orders")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn reject(request: Request) -> (StatusCode, serde_json::Value) {
        let err = ApiJson::<StatusUpdate>::from_request(request, &())
            .await
            .unwrap_err();
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let ApiJson(update) = ApiJson::<StatusUpdate>::from_request(
            json_request("application/json", r#"{"status": "shipped"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(update.status, "shipped");
    }

    #[tokio::test]
    async fn test_missing_field_is_json_bad_request() {
        let (status, body) = reject(json_request("application/json", r#"{"orderId": "x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_wrong_type_is_json_bad_request() {
        let (status, body) = reject(json_request("application/json", r#"{"status": 7}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_syntax_error_is_json_bad_request() {
        let (status, body) = reject(json_request("application/json", "{\"status\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Malformed JSON");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_json_bad_request() {
        let (status, body) = reject(json_request("text/plain", r#"{"status": "shipped"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Expected a JSON request body");
    }
}
