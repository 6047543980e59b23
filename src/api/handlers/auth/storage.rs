//! Database helpers for one-time codes, users, and sessions.

use anyhow::{Context, Result, anyhow};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::{generate_session_token, hash_session_token, is_unique_violation};

/// Outcome when attempting to consume a one-time code.
#[derive(Debug)]
pub(super) enum VerifyOutcome {
    Verified,
    NoActiveCode,
    TooManyAttempts,
    WrongCode,
}

/// User row returned by the upsert on successful verification.
pub(super) struct UserRecord {
    pub(super) id: Uuid,
    pub(super) email: String,
    pub(super) name: Option<String>,
}

/// Minimal data returned for a valid session token.
pub(crate) struct SessionRecord {
    pub(crate) user_id: Uuid,
    pub(crate) email: String,
    pub(crate) name: Option<String>,
}

/// Drop expired codes for one email so stale rows never shadow a live one.
pub(super) async fn purge_expired_codes(pool: &PgPool, email: &str) -> Result<u64> {
    let query = "DELETE FROM otp_codes WHERE email = $1 AND expires_at < NOW()";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(email)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to purge expired codes")?;
    Ok(result.rows_affected())
}

/// Persist a freshly issued code. Earlier codes for the same email may still
/// exist; verification always targets the newest unexpired row.
pub(super) async fn insert_code(
    pool: &PgPool,
    email: &str,
    code: &str,
    ttl_seconds: i64,
) -> Result<()> {
    let query = r"
        INSERT INTO otp_codes (email, code, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .bind(code)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert one-time code")?;
    Ok(())
}

pub(super) async fn user_exists(pool: &PgPool, email: &str) -> Result<bool> {
    let query = "SELECT 1 AS present FROM users WHERE email = $1 LIMIT 1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to check for existing user")?;
    Ok(row.is_some())
}

/// Consume the newest unexpired code for `email` if it matches.
///
/// The conditional `DELETE` is the only consuming path, so two concurrent
/// verifies with the same code cannot both succeed. The follow-up lookup only
/// classifies the failure; races there cost at most one extra attempt tick.
pub(super) async fn consume_code(
    pool: &PgPool,
    email: &str,
    code: &str,
    max_attempts: i32,
) -> Result<VerifyOutcome> {
    let query = r"
        DELETE FROM otp_codes
        WHERE id = (
            SELECT id
            FROM otp_codes
            WHERE email = $1
              AND expires_at >= NOW()
            ORDER BY created_at DESC
            LIMIT 1
        )
          AND code = $2
          AND attempts < $3
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let consumed = sqlx::query(query)
        .bind(email)
        .bind(code)
        .bind(max_attempts)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to consume one-time code")?;

    if consumed.is_some() {
        return Ok(VerifyOutcome::Verified);
    }

    let query = r"
        SELECT id, code, attempts
        FROM otp_codes
        WHERE email = $1
          AND expires_at >= NOW()
        ORDER BY created_at DESC
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup one-time code")?;

    let Some(row) = row else {
        return Ok(VerifyOutcome::NoActiveCode);
    };

    let id: Uuid = row.get("id");
    let stored_code: String = row.get("code");
    let attempts: i32 = row.get("attempts");

    if attempts >= max_attempts {
        // Exhausted codes are removed so the user must request a fresh one.
        delete_code(pool, id).await?;
        return Ok(VerifyOutcome::TooManyAttempts);
    }

    if stored_code != code {
        record_failed_attempt(pool, id).await?;
        return Ok(VerifyOutcome::WrongCode);
    }

    // Matching code but the delete missed: a concurrent verify consumed it.
    Ok(VerifyOutcome::NoActiveCode)
}

async fn delete_code(pool: &PgPool, id: Uuid) -> Result<()> {
    let query = "DELETE FROM otp_codes WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete one-time code")?;
    Ok(())
}

async fn record_failed_attempt(pool: &PgPool, id: Uuid) -> Result<()> {
    let query = "UPDATE otp_codes SET attempts = attempts + 1 WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to record failed attempt")?;
    Ok(())
}

/// Create or refresh the user after a successful verification.
pub(super) async fn upsert_user(pool: &PgPool, email: &str) -> Result<UserRecord> {
    let query = r"
        INSERT INTO users (email, is_verified, last_active)
        VALUES ($1, TRUE, NOW())
        ON CONFLICT (email) DO UPDATE
        SET is_verified = TRUE,
            last_active = NOW()
        RETURNING id, email, name
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to upsert user")?;

    Ok(UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
    })
}

/// Create a session and return the raw token plus its UTC expiry.
///
/// Only the token hash is stored; the raw value goes to the cookie and the
/// response body.
pub(super) async fn insert_session(
    pool: &PgPool,
    user_id: Uuid,
    ttl_seconds: i64,
) -> Result<(String, String)> {
    let query = r#"
        INSERT INTO sessions (user_id, token_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        RETURNING to_char(expires_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS expires_at
    "#;
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    for _ in 0..3 {
        let token = generate_session_token()?;
        let token_hash = hash_session_token(&token);
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(token_hash)
            .bind(ttl_seconds)
            .fetch_one(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(row) => return Ok((token, row.get("expires_at"))),
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert session"),
        }
    }

    Err(anyhow!("failed to generate unique session token"))
}

pub(super) async fn lookup_session(
    pool: &PgPool,
    token_hash: &[u8],
) -> Result<Option<SessionRecord>> {
    // Only accept unexpired sessions.
    let query = r"
        SELECT users.id, users.email, users.name
        FROM sessions
        JOIN users ON users.id = sessions.user_id
        WHERE sessions.token_hash = $1
          AND sessions.expires_at > NOW()
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    if row.is_none() {
        return Ok(None);
    }

    // Record activity for audit/visibility without extending the session TTL.
    let query = r"
        UPDATE sessions
        SET last_seen_at = NOW()
        WHERE token_hash = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update session last_seen_at")?;

    Ok(row.map(|row| SessionRecord {
        user_id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
    }))
}

pub(super) async fn delete_session(pool: &PgPool, token_hash: &[u8]) -> Result<()> {
    // Logout is idempotent; it's fine if no rows are deleted.
    let query = "DELETE FROM sessions WHERE token_hash = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;
    Ok(())
}

/// Update the display name, returning `None` when the user no longer exists.
pub(super) async fn update_user_name(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
) -> Result<Option<UserRecord>> {
    let query = r"
        UPDATE users
        SET name = $2,
            last_active = NOW()
        WHERE id = $1
        RETURNING id, email, name
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update user name")?;

    Ok(row.map(|row| UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
    }))
}
