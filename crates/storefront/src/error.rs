//! Unified error handling with Sentry integration.
//!
//! Handlers return [`Result`]; every failure leaves as `{"error": "<message>"}`.
//! Server-side failures get a generic message and their detail goes to the
//! log and to Sentry only. Missing sessions and roles are rejected earlier by
//! the auth extractors, and 429s come from the rate-limit layers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use chirag_core::{CheckoutError, OrderNumber};

use crate::db::RepositoryError;
use crate::models::CurrentUser;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order workflow failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::PasswordTooShort
                | AuthError::PasswordMismatch
                | AuthError::InvalidEmail(_)
                | AuthError::NameTooShort => StatusCode::BAD_REQUEST,
                AuthError::Repository(err) => repository_status(err),
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::Checkout(CheckoutError::UnknownProduct(_)) | OrderError::NotFound => {
                    StatusCode::NOT_FOUND
                }
                OrderError::Checkout(_)
                | OrderError::InvalidStatus(_)
                | OrderError::InvalidIdempotencyKey { .. }
                | OrderError::Transition(_) => StatusCode::BAD_REQUEST,
                OrderError::OutOfStock { .. } => StatusCode::CONFLICT,
                OrderError::OrderNumberExhausted => StatusCode::INTERNAL_SERVER_ERROR,
                OrderError::Repository(err) => repository_status(err),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return INTERNAL_MESSAGE.to_owned();
        }

        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => {
                repository_message(err)
            }
            // A stale session reads the same as a bad login
            Self::Auth(AuthError::UserNotFound) => AuthError::InvalidCredentials.to_string(),
            Self::Auth(err) => err.to_string(),
            Self::Order(OrderError::Repository(err)) => repository_message(err),
            Self::Order(err) => err.to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Internal(msg) => msg.clone(),
        }
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn repository_message(err: &RepositoryError) -> String {
    match err {
        RepositoryError::NotFound => "Not found".to_owned(),
        RepositoryError::Conflict(msg) => msg.clone(),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            INTERNAL_MESSAGE.to_owned()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the signed-in account to Sentry events from this scope.
pub fn set_sentry_user(user: &CurrentUser) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.to_string()),
            username: Some(user.name.clone()),
            ..Default::default()
        }));
        scope.set_tag("role", user.role);
    });
}

/// Forget the account on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
        scope.remove_tag("role");
    });
}

/// Leave an `order` breadcrumb so a later error report shows which order the
/// request touched.
pub fn order_breadcrumb(message: &str, order_number: &OrderNumber) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("order".to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    breadcrumb
        .data
        .insert("order_number".to_owned(), order_number.as_str().into());
    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirag_core::{OrderStatus, ProductId, TransitionError};

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("test".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_order_error_status_codes() {
        assert_eq!(
            AppError::from(OrderError::from(CheckoutError::EmptyCart)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(OrderError::from(CheckoutError::Overflow)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(OrderError::from(CheckoutError::UnknownProduct(
                ProductId::generate()
            )))
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(OrderError::OutOfStock {
                product_id: ProductId::generate(),
                product_name: "Ring".to_owned(),
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(OrderError::from(TransitionError {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            }))
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(OrderError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_repository_errors_map_by_kind() {
        assert_eq!(
            AppError::from(RepositoryError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(RepositoryError::Conflict("slug taken".to_owned())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(RepositoryError::DataCorruption("bad".to_owned())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_body_is_json_error() {
        let (status, body) = body_json(AppError::from(OrderError::from(
            CheckoutError::EmptyCart,
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cart is empty");
    }

    #[tokio::test]
    async fn test_server_errors_hide_detail() {
        let (status, body) =
            body_json(AppError::Internal("pool exhausted at 10.0.0.5".to_owned())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_MESSAGE);

        let (_, body) =
            body_json(AppError::from(RepositoryError::DataCorruption("x".to_owned()))).await;
        assert_eq!(body["error"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_auth_messages() {
        let (status, body) = body_json(AppError::from(AuthError::UserAlreadyExists)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "An account with this email already exists");

        let (status, body) = body_json(AppError::from(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
    }
}
