//! Scheduled sweep endpoints.
//!
//! Both sweeps are idempotent and report what they touched, so an external
//! scheduler can call them on a fixed cadence and alert on the counts.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use tracing::{error, info};

use super::storage::{delete_expired_codes, expire_due_incidents};
use super::types::{CleanupOtpsResponse, ExpireIncidentsResponse};
use crate::api::error::{ApiError, ErrorBody};

/// Mark all incidents past their expiry as `expired`.
#[utoipa::path(
    post,
    path = "/jobs/expire-incidents",
    responses(
        (status = 200, description = "Due incidents expired", body = ExpireIncidentsResponse),
        (status = 500, description = "Sweep failed", body = ErrorBody)
    ),
    tag = "jobs"
)]
pub async fn expire_incidents(pool: Extension<PgPool>) -> impl IntoResponse {
    match expire_due_incidents(&pool).await {
        Ok(expired) => {
            let expired_count = expired.len();
            info!(expired = expired_count, "incident expiration sweep complete");

            let response = ExpireIncidentsResponse {
                success: true,
                message: format!("Successfully expired {expired_count} incidents"),
                expired_count,
                expired_incidents: expired,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            error!("Failed to expire incidents: {err}");
            ApiError::Internal.into_response()
        }
    }
}

/// Delete expired one-time codes left behind by abandoned logins.
#[utoipa::path(
    post,
    path = "/jobs/cleanup-otps",
    responses(
        (status = 200, description = "Expired codes removed", body = CleanupOtpsResponse),
        (status = 500, description = "Sweep failed", body = ErrorBody)
    ),
    tag = "jobs"
)]
pub async fn cleanup_otps(pool: Extension<PgPool>) -> impl IntoResponse {
    match delete_expired_codes(&pool).await {
        Ok(cleaned) => {
            let cleaned_count = cleaned.len();
            info!(cleaned = cleaned_count, "one-time code cleanup complete");

            let response = CleanupOtpsResponse {
                success: true,
                message: format!("Successfully cleaned up {cleaned_count} expired OTPs"),
                cleaned_count,
                cleaned_otps: cleaned,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            error!("Failed to clean up expired codes: {err}");
            ApiError::Internal.into_response()
        }
    }
}
