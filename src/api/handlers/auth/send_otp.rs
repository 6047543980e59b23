//! One-time code issuance endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::otp::generate_otp_code;
use super::rate_limit::RateLimitAction;
use super::state::AuthState;
use super::storage::{insert_code, user_exists};
use super::types::{SendOtpRequest, SendOtpResponse};
use super::utils::{extract_client_ip, normalize_email, valid_email};
use crate::api::email::Mailer;
use crate::api::error::{ApiError, ErrorBody};

/// Issue a six-digit one-time code and email it to the requested address.
#[utoipa::path(
    post,
    path = "/send-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "One-time code issued", body = SendOtpResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Email delivery or storage failed", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn send_otp(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    mailer: Extension<Arc<Mailer>>,
    payload: Option<Json<SendOtpRequest>>,
) -> impl IntoResponse {
    let request: SendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return ApiError::Validation("Email is required".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if email.is_empty() {
        return ApiError::Validation("Email is required".to_string()).into_response();
    }
    if !valid_email(&email) {
        return ApiError::Validation("Invalid email address".to_string()).into_response();
    }

    // Rate limits are enforced before any code is generated or stored.
    let client_ip = extract_client_ip(&headers);
    let limiter = auth_state.rate_limiter();
    if limiter
        .check_ip(client_ip.as_deref(), RateLimitAction::SendOtp)
        .is_limited()
        || limiter.check_email(&email, RateLimitAction::SendOtp).is_limited()
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    let code = match generate_otp_code() {
        Ok(code) => code,
        Err(err) => {
            error!("Failed to generate one-time code: {err}");
            return ApiError::Internal.into_response();
        }
    };

    // Tells the client whether to expect a signup or a login after verification.
    let is_existing_user = match user_exists(&pool, &email).await {
        Ok(exists) => exists,
        Err(err) => {
            error!("Failed to check for existing user: {err}");
            false
        }
    };

    // Deliver first, persist after: a code that never reached the inbox
    // must not be accepted later.
    let ttl_seconds = auth_state.config().otp_ttl_seconds();
    let ttl_minutes = (ttl_seconds / 60).max(1);
    let receipt = match mailer.send_code(&email, &code, ttl_minutes).await {
        Ok(receipt) => receipt,
        Err(err) => {
            error!("Failed to send one-time code email: {err}");
            return ApiError::Downstream.into_response();
        }
    };

    if let Err(err) = insert_code(&pool, &email, &code, ttl_seconds).await {
        error!("Failed to store one-time code: {err}");
        return ApiError::Internal.into_response();
    }

    let response = SendOtpResponse {
        success: true,
        message: "OTP sent successfully".to_string(),
        email,
        message_id: receipt.message_id,
        is_existing_user,
    };
    (StatusCode::OK, Json(response)).into_response()
}
