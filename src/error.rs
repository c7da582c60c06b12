/// Unified error types for Hostel Hub
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum HubError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or invalid session
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Wrong role for the endpoint, or a banned account
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Malformed input or a business-rule violation
    #[error("{0}")]
    Validation(String),

    /// Not found errors
    #[error("{0}")]
    NotFound(String),

    /// Conflict errors (e.g., duplicate account)
    #[error("{0}")]
    Conflict(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after: std::time::Duration },

    /// Image storage errors
    #[error("Image storage error: {0}")]
    ImageStorage(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON envelope shared by every response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

impl HubError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HubError::Authentication(_) => StatusCode::UNAUTHORIZED,
            HubError::Authorization(_) => StatusCode::FORBIDDEN,
            HubError::Validation(_) => StatusCode::BAD_REQUEST,
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            HubError::Conflict(_) => StatusCode::CONFLICT,
            HubError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            HubError::Database(_)
            | HubError::ImageStorage(_)
            | HubError::Internal(_)
            | HubError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for the error counter
    pub fn kind(&self) -> &'static str {
        match self {
            HubError::Database(_) => "database",
            HubError::Authentication(_) => "authentication",
            HubError::Authorization(_) => "authorization",
            HubError::Validation(_) => "validation",
            HubError::NotFound(_) => "not_found",
            HubError::Conflict(_) => "conflict",
            HubError::RateLimitExceeded { .. } => "rate_limit",
            HubError::ImageStorage(_) => "image_storage",
            HubError::Internal(_) => "internal",
            HubError::Io(_) => "io",
        }
    }
}

/// Convert HubError to HTTP response
impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        crate::metrics::record_error(self.kind());

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string() // Don't leak details
        } else {
            self.to_string()
        };

        let retry_after = match &self {
            HubError::RateLimitExceeded { retry_after } => Some(retry_after_seconds(*retry_after)),
            _ => None,
        };

        let body = Json(ErrorEnvelope {
            success: false,
            message,
        });

        let mut response = (status, body).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

/// Whole seconds for `Retry-After`, rounded up and never zero
fn retry_after_seconds(wait: std::time::Duration) -> u64 {
    let whole = wait.as_secs();
    let seconds = if wait.subsec_nanos() > 0 { whole + 1 } else { whole };
    seconds.max(1)
}

/// Surface the first field message from a validator failure
impl From<validator::ValidationErrors> for HubError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string());
        HubError::Validation(message)
    }
}

/// Result type alias for service operations
pub type HubResult<T> = Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            HubError::Authentication("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HubError::Authorization("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            HubError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HubError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HubError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let response = HubError::RateLimitExceeded {
            retry_after: std::time::Duration::from_millis(2_300),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");

        let response = HubError::Conflict("taken".into()).into_response();
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_seconds(std::time::Duration::ZERO), 1);
        assert_eq!(retry_after_seconds(std::time::Duration::from_millis(10)), 1);
        assert_eq!(retry_after_seconds(std::time::Duration::from_secs(60)), 60);
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = HubError::Validation("Please wait 30 minutes before resubmitting".into());
        assert_eq!(err.to_string(), "Please wait 30 minutes before resubmitting");
    }
}
