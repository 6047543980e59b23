//! Auth module tests.
//!
//! Database scenarios need a reachable Postgres. Set `AVIZO_TEST_DSN` to run
//! them; without it each test skips and passes.

use super::storage::{
    VerifyOutcome, consume_code, delete_session, insert_code, insert_session, lookup_session,
    purge_expired_codes, update_user_name, upsert_user, user_exists,
};
use super::utils::hash_session_token;
use anyhow::{Context, Result, anyhow};
use sqlx::{Connection, PgConnection, PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

const AVIZO_SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const SCHEMA_LOCK_KEY: i64 = 0x6176_697a_6f;

pub(crate) struct TestDb {
    pub(crate) pool: PgPool,
}

impl TestDb {
    pub(crate) async fn new() -> Result<Self> {
        let Ok(dsn) = std::env::var("AVIZO_TEST_DSN") else {
            eprintln!("Skipping integration test: AVIZO_TEST_DSN is not set");
            return Err(anyhow!("AVIZO_TEST_DSN is not set"));
        };

        apply_schema(&dsn).await?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&dsn)
            .await
            .context("failed to connect test pool")?;

        Ok(Self { pool })
    }

    /// Remove rows for one email so tests stay independent on a shared database.
    pub(crate) async fn cleanup_email(&self, email: &str) -> Result<()> {
        sqlx::query("DELETE FROM otp_codes WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "DELETE FROM sessions WHERE user_id IN (SELECT id FROM users WHERE email = $1)",
        )
        .bind(email)
        .execute(&self.pool)
        .await?;
        sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

async fn apply_schema(dsn: &str) -> Result<()> {
    let mut connection = PgConnection::connect(dsn)
        .await
        .context("failed to connect for schema setup")?;

    // Tests share one database; serialize DDL so concurrent
    // `CREATE TABLE IF NOT EXISTS` calls cannot race each other.
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut connection)
        .await
        .context("failed to take schema lock")?;

    let mut apply = Ok(());
    for (index, statement) in split_sql_statements(AVIZO_SCHEMA_SQL).iter().enumerate() {
        if let Err(err) = sqlx::query(statement).execute(&mut connection).await {
            apply = Err(err)
                .with_context(|| format!("failed to execute schema statement {}", index + 1));
            break;
        }
    }

    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut connection)
        .await
        .context("failed to release schema lock")?;

    apply
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("\\ir ") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[test]
fn split_sql_statements_handles_multiline() {
    let statements =
        split_sql_statements("CREATE TABLE a (\n  id int\n);\nCREATE INDEX b ON a (id);\n");
    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("CREATE TABLE"));
}

#[tokio::test]
async fn issue_then_verify_consumes_code() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "otp-flow@example.com";
    db.cleanup_email(email).await?;

    insert_code(&db.pool, email, "482913", 60).await?;

    let first = consume_code(&db.pool, email, "482913", 3).await?;
    assert!(matches!(first, VerifyOutcome::Verified));

    // The code is single-use; replaying it finds nothing to consume.
    let second = consume_code(&db.pool, email, "482913", 3).await?;
    assert!(matches!(second, VerifyOutcome::NoActiveCode));

    Ok(())
}

#[tokio::test]
async fn expired_code_rejected_and_purged() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "expired-code@example.com";
    db.cleanup_email(email).await?;

    // Negative TTL lands the expiry in the past.
    insert_code(&db.pool, email, "482913", -1).await?;

    let outcome = consume_code(&db.pool, email, "482913", 3).await?;
    assert!(matches!(outcome, VerifyOutcome::NoActiveCode));

    let purged = purge_expired_codes(&db.pool, email).await?;
    assert_eq!(purged, 1);

    Ok(())
}

#[tokio::test]
async fn wrong_code_locks_out_after_max_attempts() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "lockout@example.com";
    db.cleanup_email(email).await?;

    insert_code(&db.pool, email, "482913", 60).await?;

    for _ in 0..3 {
        let outcome = consume_code(&db.pool, email, "000000", 3).await?;
        assert!(matches!(outcome, VerifyOutcome::WrongCode));
    }

    // Even the correct code is refused once attempts are exhausted, and the
    // row is deleted so the user must request a fresh code.
    let outcome = consume_code(&db.pool, email, "482913", 3).await?;
    assert!(matches!(outcome, VerifyOutcome::TooManyAttempts));

    let outcome = consume_code(&db.pool, email, "482913", 3).await?;
    assert!(matches!(outcome, VerifyOutcome::NoActiveCode));

    Ok(())
}

#[tokio::test]
async fn newest_code_wins() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "newest-code@example.com";
    db.cleanup_email(email).await?;

    insert_code(&db.pool, email, "111111", 60).await?;
    // Keep created_at strictly ordered between the two rows.
    tokio::time::sleep(Duration::from_millis(10)).await;
    insert_code(&db.pool, email, "222222", 60).await?;

    let outcome = consume_code(&db.pool, email, "111111", 3).await?;
    assert!(matches!(outcome, VerifyOutcome::WrongCode));

    let outcome = consume_code(&db.pool, email, "222222", 3).await?;
    assert!(matches!(outcome, VerifyOutcome::Verified));

    Ok(())
}

#[tokio::test]
async fn concurrent_verify_has_single_winner() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "concurrent-verify@example.com";
    db.cleanup_email(email).await?;

    insert_code(&db.pool, email, "482913", 60).await?;

    let (first, second) = tokio::join!(
        consume_code(&db.pool, email, "482913", 3),
        consume_code(&db.pool, email, "482913", 3),
    );

    let outcomes = [first?, second?];
    let verified = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, VerifyOutcome::Verified))
        .count();
    assert_eq!(verified, 1, "exactly one request may consume the code");

    Ok(())
}

#[tokio::test]
async fn upsert_user_is_idempotent() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "upsert@example.com";
    db.cleanup_email(email).await?;

    assert!(!user_exists(&db.pool, email).await?);

    let first = upsert_user(&db.pool, email).await?;
    let second = upsert_user(&db.pool, email).await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.email, email);

    assert!(user_exists(&db.pool, email).await?);

    Ok(())
}

#[tokio::test]
async fn session_round_trip() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "session@example.com";
    db.cleanup_email(email).await?;

    let user = upsert_user(&db.pool, email).await?;
    let (token, expires_at) = insert_session(&db.pool, user.id, 3600).await?;
    assert!(expires_at.ends_with('Z'));

    let token_hash = hash_session_token(&token);
    let record = lookup_session(&db.pool, &token_hash)
        .await?
        .context("expected active session")?;
    assert_eq!(record.user_id, user.id);
    assert_eq!(record.email, email);

    delete_session(&db.pool, &token_hash).await?;
    assert!(lookup_session(&db.pool, &token_hash).await?.is_none());

    // Deleting again is a no-op.
    delete_session(&db.pool, &token_hash).await?;

    Ok(())
}

#[tokio::test]
async fn expired_session_rejected() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "expired-session@example.com";
    db.cleanup_email(email).await?;

    let user = upsert_user(&db.pool, email).await?;
    let (token, _expires_at) = insert_session(&db.pool, user.id, -60).await?;

    let token_hash = hash_session_token(&token);
    assert!(lookup_session(&db.pool, &token_hash).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn update_user_name_persists() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };
    let email = "rename@example.com";
    db.cleanup_email(email).await?;

    let user = upsert_user(&db.pool, email).await?;
    assert!(user.name.is_none());

    let updated = update_user_name(&db.pool, user.id, "Alice")
        .await?
        .context("expected updated user")?;
    assert_eq!(updated.name.as_deref(), Some("Alice"));

    // Unknown users yield None instead of an error.
    let missing = update_user_name(&db.pool, Uuid::new_v4(), "Nobody").await?;
    assert!(missing.is_none());

    Ok(())
}
