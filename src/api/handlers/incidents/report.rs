//! Incident report submission.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::error;

use super::IncidentConfig;
use super::storage::{NewIncident, insert_incident};
use super::types::{
    ReportIncidentRequest, ReportIncidentResponse, valid_incident_type, valid_severity,
};
use crate::api::error::{ApiError, ErrorBody};
use crate::api::handlers::auth::session::authenticate_session;

/// Submit a new incident report.
///
/// Reports are accepted anonymously; a valid session only attributes the
/// report to its author.
#[utoipa::path(
    post,
    path = "/incidents",
    request_body = ReportIncidentRequest,
    responses(
        (status = 201, description = "Incident recorded", body = ReportIncidentResponse),
        (status = 400, description = "Invalid report", body = ErrorBody),
        (status = 500, description = "Storage failed", body = ErrorBody)
    ),
    tag = "incidents"
)]
pub async fn report_incident(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    incident_config: Extension<IncidentConfig>,
    payload: Option<Json<ReportIncidentRequest>>,
) -> impl IntoResponse {
    let request: ReportIncidentRequest = match payload {
        Some(Json(payload)) => payload,
        None => return ApiError::Validation("Missing payload".to_string()).into_response(),
    };

    let title = request.title.trim();
    if title.is_empty() {
        return ApiError::Validation("Title is required".to_string()).into_response();
    }
    if title.chars().count() > 100 {
        return ApiError::Validation("Title must be less than 100 characters".to_string())
            .into_response();
    }
    if !valid_incident_type(&request.incident_type) {
        return ApiError::Validation("Please select an incident type".to_string()).into_response();
    }
    if !valid_severity(&request.severity) {
        return ApiError::Validation("Please select a severity level".to_string()).into_response();
    }
    if !(-90.0..=90.0).contains(&request.latitude) {
        return ApiError::Validation("Invalid latitude".to_string()).into_response();
    }
    if !(-180.0..=180.0).contains(&request.longitude) {
        return ApiError::Validation("Invalid longitude".to_string()).into_response();
    }

    let user_id = match authenticate_session(&headers, &pool).await {
        Ok(record) => record.map(|record| record.user_id),
        Err(err) => return err.into_response(),
    };

    let incident = NewIncident {
        title: title.to_string(),
        description: normalize_optional(request.description),
        incident_type: request.incident_type,
        severity: request.severity,
        latitude: request.latitude,
        longitude: request.longitude,
        address: normalize_optional(request.address),
        user_id,
    };

    match insert_incident(&pool, incident, incident_config.ttl_seconds()).await {
        Ok(incident) => {
            let response = ReportIncidentResponse {
                success: true,
                incident,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(err) => {
            error!("Failed to insert incident: {err}");
            ApiError::Internal.into_response()
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
