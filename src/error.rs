// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::auth::JwtError;
use crate::database::DatabaseError;
use crate::document::DocumentError;
use crate::services::{OtpError, ProductError, ResetError};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error; `details` carries the underlying cause
    InternalServerError {
        message: String,
        details: Option<String>,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });
        if let ApiError::InternalServerError {
            details: Some(details),
            ..
        } = self
        {
            body["details"] = json!(details);
        }
        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            details: None,
        }
    }

    pub fn internal_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_with_details("Database error occurred", other.to_string())
            }
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InvalidDesignName
            | DocumentError::DuplicateDesign(_)
            | DocumentError::InvalidRename(_)
            | DocumentError::InvalidIndex { .. }
            | DocumentError::NotItemList(_)
            | DocumentError::ItemNotFound { .. } => ApiError::bad_request(err.to_string()),
            DocumentError::DesignNotFound(_) | DocumentError::ProductNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            DocumentError::WriteConflict { .. } => {
                tracing::warn!("{}", err);
                ApiError::conflict(err.to_string())
            }
            DocumentError::Serialization(e) => {
                tracing::error!("Design document serialization error: {}", e);
                ApiError::internal_with_details("Failed to save design document", e.to_string())
            }
            DocumentError::Database(e) => e.into(),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound | ProductError::NotVisible => ApiError::not_found(err.to_string()),
            ProductError::NoFieldsToUpdate
            | ProductError::InvalidTabSettings(_)
            | ProductError::InvalidProductType(_)
            | ProductError::MissingField(_) => ApiError::bad_request(err.to_string()),
            ProductError::Database(e) => e.into(),
        }
    }
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::MissingFields(_)
            | OtpError::InvalidCredentials
            | OtpError::NotFound
            | OtpError::InvalidCode
            | OtpError::TooManyAttempts
            | OtpError::UserNotFound => ApiError::bad_request(err.to_string()),
            OtpError::SubscriptionInactive => ApiError::forbidden(err.to_string()),
            OtpError::Delivery(ref e) => {
                tracing::error!("OTP delivery failed: {}", e);
                ApiError::internal_server_error(err.to_string())
            }
            OtpError::Token(e) => e.into(),
            OtpError::Serialization(e) => {
                ApiError::internal_with_details("Failed to send OTP", e.to_string())
            }
            OtpError::Database(e) => e.into(),
        }
    }
}

impl From<ResetError> for ApiError {
    fn from(err: ResetError) -> Self {
        match err {
            ResetError::MissingFields(_)
            | ResetError::NotFound
            | ResetError::InvalidToken
            | ResetError::PasswordMismatch
            | ResetError::PasswordTooShort => ApiError::bad_request(err.to_string()),
            ResetError::UnknownEmail | ResetError::UserNotFound => {
                ApiError::not_found(err.to_string())
            }
            ResetError::Delivery(ref e) => {
                tracing::error!("Password reset delivery failed: {}", e);
                ApiError::internal_server_error(err.to_string())
            }
            ResetError::Hash(ref e) => {
                ApiError::internal_with_details("Failed to reset password", e.clone())
            }
            ResetError::Serialization(e) => {
                ApiError::internal_with_details("Failed to send reset email", e.to_string())
            }
            ResetError::Database(e) => e.into(),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(msg) => ApiError::unauthorized(format!("Invalid JWT token: {}", msg)),
            other => {
                tracing::error!("JWT error: {}", other);
                ApiError::internal_with_details("Server error", other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_errors_map_to_status_codes() {
        let cases = [
            (DocumentError::DuplicateDesign("A".into()), 400),
            (DocumentError::InvalidIndex { design: "d".into(), index: 3, len: 1 }, 400),
            (DocumentError::ItemNotFound { design: "d".into(), index: 0 }, 400),
            (DocumentError::NotItemList("Legacy".into()), 400),
            (DocumentError::DesignNotFound("A".into()), 404),
            (DocumentError::ProductNotFound("9".into()), 404),
            (DocumentError::WriteConflict { product_id: 1, attempts: 3 }, 409),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code().as_u16(), status);
        }
    }

    #[test]
    fn internal_errors_carry_details() {
        let err = ApiError::from(DatabaseError::QueryError("relation missing".into()));
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
        assert!(body["details"].as_str().unwrap().contains("relation missing"));
    }

    #[test]
    fn client_errors_omit_details() {
        let body = ApiError::from(ProductError::NoFieldsToUpdate).to_json();
        assert_eq!(body["error"], "No valid fields to update");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn inactive_subscription_is_forbidden() {
        let err = ApiError::from(OtpError::SubscriptionInactive);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn reset_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(ResetError::UnknownEmail).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ResetError::InvalidToken).status_code(),
            StatusCode::BAD_REQUEST
        );
        let err = ApiError::from(ResetError::Hash("cost out of range".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_json()["details"], "cost out of range");
    }
}
