//! One-time code verification and session establishment.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::rate_limit::RateLimitAction;
use super::session::session_cookie;
use super::state::AuthState;
use super::storage::{
    VerifyOutcome, consume_code, insert_session, purge_expired_codes, upsert_user,
};
use super::types::{SessionPayload, UserPayload, VerifyOtpRequest, VerifyOtpResponse};
use super::utils::{extract_client_ip, normalize_email};
use crate::api::error::{ApiError, ErrorBody};

/// Verify a one-time code; on success the user is upserted and a session minted.
#[utoipa::path(
    post,
    path = "/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Session established", body = VerifyOtpResponse),
        (status = 400, description = "Invalid, expired, or locked-out code", body = ErrorBody),
        (status = 500, description = "Verification failed", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return ApiError::Validation("Email and OTP are required".to_string()).into_response();
        }
    };

    let email = normalize_email(&request.email);
    let code = request.otp.trim();
    if email.is_empty() || code.is_empty() {
        return ApiError::Validation("Email and OTP are required".to_string()).into_response();
    }

    let client_ip = extract_client_ip(&headers);
    let limiter = auth_state.rate_limiter();
    if limiter
        .check_ip(client_ip.as_deref(), RateLimitAction::VerifyOtp)
        .is_limited()
        || limiter.check_email(&email, RateLimitAction::VerifyOtp).is_limited()
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    // Expired rows are cleared first so they can never mask a live code.
    if let Err(err) = purge_expired_codes(&pool, &email).await {
        error!("Failed to purge expired codes: {err}");
        return ApiError::Internal.into_response();
    }

    match consume_code(&pool, &email, code, auth_state.config().otp_max_attempts()).await {
        Ok(VerifyOutcome::Verified) => establish_session(&pool, &auth_state, &email).await,
        Ok(VerifyOutcome::NoActiveCode) => ApiError::InvalidOrExpiredCode.into_response(),
        Ok(VerifyOutcome::TooManyAttempts) => ApiError::TooManyAttempts.into_response(),
        Ok(VerifyOutcome::WrongCode) => ApiError::InvalidCode.into_response(),
        Err(err) => {
            error!("Failed to verify one-time code: {err}");
            ApiError::Internal.into_response()
        }
    }
}

/// Upsert the verified user and mint their session.
///
/// The code row is already gone at this point, so failures here surface as
/// internal errors rather than another verification round.
async fn establish_session(pool: &PgPool, auth_state: &AuthState, email: &str) -> Response {
    let user = match upsert_user(pool, email).await {
        Ok(user) => user,
        Err(err) => {
            error!("Failed to upsert user: {err}");
            return ApiError::Internal.into_response();
        }
    };

    let ttl_seconds = auth_state.config().session_ttl_seconds();
    let (token, expires_at) = match insert_session(pool, user.id, ttl_seconds).await {
        Ok(session) => session,
        Err(err) => {
            error!("Failed to create session: {err}");
            return ApiError::Internal.into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = session_cookie(auth_state, &token) {
        response_headers.insert(SET_COOKIE, cookie);
    }

    let response = VerifyOtpResponse {
        success: true,
        message: "OTP verified successfully".to_string(),
        user: UserPayload {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
        },
        session: SessionPayload { token, expires_at },
    };
    (StatusCode::OK, response_headers, Json(response)).into_response()
}
