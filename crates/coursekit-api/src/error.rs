//! Error types for the Coursekit API server.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Domain
//! rejections keep their own status codes: a paid course answers `402`,
//! a rejected payout answers `422`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coursekit_core::PayoutError;
use coursekit_db::DbError;
use rust_decimal::Decimal;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Enrollment requires a confirmed payment first.
    #[error("payment of {price} required")]
    PaymentRequired {
        /// The effective course price.
        price: Decimal,
    },

    /// The request body was well formed but failed a validation rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The account may not perform this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A payout request was rejected by validation.
    #[error(transparent)]
    Payout(#[from] PayoutError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id}")),
            DbError::NotInstructor(id) => {
                Self::Forbidden(format!("account {id} is not an instructor"))
            }
            DbError::Enroll(coursekit_core::EnrollError::PaymentRequired { price }) => {
                Self::PaymentRequired { price }
            }
            DbError::Payout(e) => Self::Payout(e),
            DbError::Serialization(e) => Self::Serialization(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::PaymentRequired { .. } => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            Self::InvalidUuid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::Payout(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_required_maps_to_402() {
        let err = ApiError::PaymentRequired {
            price: Decimal::new(4900, 2),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn payout_rejection_maps_to_422() {
        let err = ApiError::from(DbError::Payout(PayoutError::InsufficientBalance {
            requested: Decimal::new(100, 0),
            available: Decimal::ZERO,
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn validation_failure_maps_to_422() {
        let err = ApiError::Validation("username: length".to_owned());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn malformed_uuid_maps_to_400() {
        let err = ApiError::InvalidUuid("not-a-uuid".to_owned());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn db_not_found_maps_to_404() {
        let err = ApiError::from(DbError::NotFound {
            entity: "course",
            id: uuid::Uuid::nil(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
