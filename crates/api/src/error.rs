//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::DomainError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout or lifecycle error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::Domain(domain_err) => match domain_err {
            DomainError::Validation(_)
            | DomainError::EmptyCart
            | DomainError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
        },
        CheckoutError::Store(store_err) => match store_err {
            StoreError::InsufficientStock { .. } | StoreError::DuplicateOrder(_) => {
                StatusCode::CONFLICT
            }
            StoreError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
            StoreError::ProductNotFound(_) | StoreError::OrderNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            StoreError::Timeout(_)
            | StoreError::Database(_)
            | StoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        CheckoutError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "internal server error");
    }
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Checkout(CheckoutError::Domain(err))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Checkout(CheckoutError::Store(err))
    }
}
