//! Error taxonomy shared by all handlers.
//!
//! Every failure serializes to the same `{error, code}` JSON body so clients
//! can branch on `code` without parsing prose.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredCode,
    #[error("Invalid OTP. Please try again.")]
    InvalidCode,
    #[error("Too many failed attempts. Please request a new OTP.")]
    TooManyAttempts,
    #[error("Authentication required")]
    Unauthorized,
    #[error("User not found")]
    UserNotFound,
    #[error("Failed to send email")]
    Downstream,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::InvalidOrExpiredCode
            | Self::InvalidCode
            | Self::TooManyAttempts => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Downstream | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code; the `error` message may change.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidOrExpiredCode => "invalid_or_expired_code",
            Self::InvalidCode => "invalid_code",
            Self::TooManyAttempts => "too_many_attempts",
            Self::Unauthorized => "unauthorized",
            Self::UserNotFound => "user_not_found",
            Self::Downstream => "downstream_failure",
            Self::Internal => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_per_variant() {
        assert_eq!(
            ApiError::Validation("Email is required".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidOrExpiredCode.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::TooManyAttempts.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Downstream.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(
            ApiError::InvalidOrExpiredCode.to_string(),
            "Invalid or expired OTP"
        );
        assert_eq!(
            ApiError::TooManyAttempts.to_string(),
            "Too many failed attempts. Please request a new OTP."
        );
        assert_eq!(
            ApiError::InvalidCode.to_string(),
            "Invalid OTP. Please try again."
        );
    }

    #[tokio::test]
    async fn response_body_is_fixed_schema() -> anyhow::Result<()> {
        let response = ApiError::InvalidOrExpiredCode.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body: ErrorBody = serde_json::from_slice(&bytes)?;
        assert_eq!(body.error, "Invalid or expired OTP");
        assert_eq!(body.code, "invalid_or_expired_code");
        Ok(())
    }
}
