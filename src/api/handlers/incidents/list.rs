//! Public incident listing.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use tracing::error;

use super::storage::list_active_incidents;
use super::types::ListIncidentsResponse;
use crate::api::error::{ApiError, ErrorBody};

/// List all active incidents, newest first. No authentication required.
#[utoipa::path(
    get,
    path = "/incidents",
    responses(
        (status = 200, description = "Active incidents", body = ListIncidentsResponse),
        (status = 500, description = "Listing failed", body = ErrorBody)
    ),
    tag = "incidents"
)]
pub async fn list_incidents(pool: Extension<PgPool>) -> impl IntoResponse {
    match list_active_incidents(&pool).await {
        Ok(incidents) => {
            let response = ListIncidentsResponse {
                success: true,
                incidents,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            error!("Failed to list incidents: {err}");
            ApiError::Internal.into_response()
        }
    }
}
