//! REST error type and its mapping onto HTTP responses.
//!
//! Client errors carry a stable message (and, for validation, the itemised field messages).
//! Storage and other internal failures are logged here and surfaced with a generic body so no
//! filesystem detail leaks to callers.

use crate::dto::{MessageRes, ValidationErrorRes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::{CatalogError, ImagesError};

pub const VALIDATION_FAILED: &str = "Validation failed!";
pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const NO_PRODUCTS_FOUND: &str = "No products found";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const IMAGE_TOO_LARGE: &str = "Image exceeds the 1 MiB size limit";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One message per failing field.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorRes {
                    message: VALIDATION_FAILED.into(),
                    errors,
                }),
            )
                .into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(MessageRes::new(message))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(MessageRes::new(message))).into_response()
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageRes::new(INTERNAL_SERVER_ERROR)),
            )
                .into_response(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ValidationFailed(errors) => {
                ApiError::Validation(errors.iter().map(ToString::to_string).collect())
            }
            CatalogError::NotFound(_) => ApiError::NotFound(PRODUCT_NOT_FOUND),
            CatalogError::NoProducts => ApiError::NotFound(NO_PRODUCTS_FOUND),
            CatalogError::Image(e) => e.into(),
            other => {
                tracing::error!("catalog operation failed: {:?}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<ImagesError> for ApiError {
    fn from(err: ImagesError) -> Self {
        match err {
            ImagesError::NotAnImage => ApiError::BadRequest(err.to_string()),
            ImagesError::TooLarge(_) => ApiError::BadRequest(IMAGE_TOO_LARGE.into()),
            other => {
                tracing::error!("image storage failed: {:?}", other);
                ApiError::Internal
            }
        }
    }
}
