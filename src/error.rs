//! Error types for the catalog service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Catalog Error Enum ==
/// Unified error type for the catalog service.
///
/// Only source-of-truth failures travel through this type. Cache tier
/// failures are absorbed by the distributed cache and never reach callers.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Product not found in the store
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The backing product store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The operation was cancelled before the store answered
    #[error("Operation cancelled")]
    Cancelled,
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match &self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CatalogError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the catalog service.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CatalogError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CatalogError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (CatalogError::Storage("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (CatalogError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CatalogError::NotFound("abc".into()).to_string(),
            "Product not found: abc"
        );
        assert_eq!(CatalogError::Cancelled.to_string(), "Operation cancelled");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = CatalogError::InvalidRequest("name is required".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"error": "Invalid request: name is required"})
        );
    }
}
