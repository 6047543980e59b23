//! Request/response types for incident endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Incident categories accepted by `/incidents`.
pub(super) const INCIDENT_TYPES: [&str; 7] = [
    "water_logging",
    "fallen_trees",
    "sewage_issues",
    "house_flooding",
    "wildlife_hazard",
    "vehicle_stuck",
    "other",
];

/// Severity levels accepted by `/incidents`.
pub(super) const SEVERITY_LEVELS: [&str; 4] = ["low", "medium", "high", "urgent"];

pub(super) fn valid_incident_type(value: &str) -> bool {
    INCIDENT_TYPES.contains(&value)
}

pub(super) fn valid_severity(value: &str) -> bool {
    SEVERITY_LEVELS.contains(&value)
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ReportIncidentRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub severity: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

/// Wire shape of a stored incident. Timestamps are UTC ISO-8601 strings.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPayload {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub severity: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub status: String,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ListIncidentsResponse {
    pub success: bool,
    pub incidents: Vec<IncidentPayload>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ReportIncidentResponse {
    pub success: bool,
    pub incident: IncidentPayload,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ExpiredIncident {
    pub id: String,
    pub title: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExpireIncidentsResponse {
    pub success: bool,
    pub message: String,
    pub expired_count: usize,
    pub expired_incidents: Vec<ExpiredIncident>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CleanedOtp {
    pub id: String,
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOtpsResponse {
    pub success: bool,
    pub message: String,
    pub cleaned_count: usize,
    pub cleaned_otps: Vec<CleanedOtp>,
}
