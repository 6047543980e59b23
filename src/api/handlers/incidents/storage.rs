//! Database helpers for incident rows and scheduled sweeps.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::types::{CleanedOtp, ExpiredIncident, IncidentPayload};

/// Validated fields for a new incident report.
pub(super) struct NewIncident {
    pub(super) title: String,
    pub(super) description: Option<String>,
    pub(super) incident_type: String,
    pub(super) severity: String,
    pub(super) latitude: f64,
    pub(super) longitude: f64,
    pub(super) address: Option<String>,
    pub(super) user_id: Option<Uuid>,
}

fn incident_from_row(row: &PgRow) -> IncidentPayload {
    IncidentPayload {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        incident_type: row.get("incident_type"),
        severity: row.get("severity"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        address: row.get("address"),
        status: row.get("status"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        user_id: row.get("user_id"),
    }
}

/// Active incidents, newest first. Expired-but-unswept rows are excluded by
/// status, not by timestamp, so the sweep remains the single expiry authority.
pub(super) async fn list_active_incidents(pool: &PgPool) -> Result<Vec<IncidentPayload>> {
    let query = r#"
        SELECT id::text AS id, title, description, type AS incident_type, severity,
               latitude, longitude, address, status,
               to_char(expires_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS expires_at,
               to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
               to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at,
               user_id::text AS user_id
        FROM incidents
        WHERE status = 'active'
        ORDER BY created_at DESC
    "#;
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list incidents")?;

    Ok(rows.iter().map(incident_from_row).collect())
}

pub(super) async fn insert_incident(
    pool: &PgPool,
    incident: NewIncident,
    ttl_seconds: i64,
) -> Result<IncidentPayload> {
    let query = r#"
        INSERT INTO incidents
            (title, description, type, severity, latitude, longitude, address, user_id, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW() + ($9 * INTERVAL '1 second'))
        RETURNING id::text AS id, title, description, type AS incident_type, severity,
               latitude, longitude, address, status,
               to_char(expires_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS expires_at,
               to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
               to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at,
               user_id::text AS user_id
    "#;
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(&incident.title)
        .bind(&incident.description)
        .bind(&incident.incident_type)
        .bind(&incident.severity)
        .bind(incident.latitude)
        .bind(incident.longitude)
        .bind(&incident.address)
        .bind(incident.user_id)
        .bind(ttl_seconds)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert incident")?;

    Ok(incident_from_row(&row))
}

/// Flip every due incident to `expired` and report what changed.
///
/// The status guard makes the sweep idempotent: a rerun sees no `active` rows
/// past their expiry and reports zero.
pub(super) async fn expire_due_incidents(pool: &PgPool) -> Result<Vec<ExpiredIncident>> {
    let query = r"
        UPDATE incidents
        SET status = 'expired',
            updated_at = NOW()
        WHERE status = 'active'
          AND expires_at IS NOT NULL
          AND expires_at <= NOW()
        RETURNING id::text AS id, title
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to expire incidents")?;

    Ok(rows
        .iter()
        .map(|row| ExpiredIncident {
            id: row.get("id"),
            title: row.get("title"),
        })
        .collect())
}

/// Delete expired one-time codes across all emails.
pub(super) async fn delete_expired_codes(pool: &PgPool) -> Result<Vec<CleanedOtp>> {
    let query = r"
        DELETE FROM otp_codes
        WHERE expires_at < NOW()
        RETURNING id::text AS id, email
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to delete expired codes")?;

    Ok(rows
        .iter()
        .map(|row| CleanedOtp {
            id: row.get("id"),
            email: row.get("email"),
        })
        .collect())
}
