//! Profile update endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::error;

use super::session::require_session;
use super::storage;
use super::types::{UpdateUserNameRequest, UpdateUserNameResponse, UserPayload};
use super::utils::normalize_email;
use crate::api::error::{ApiError, ErrorBody};

/// Update the signed-in user's display name.
#[utoipa::path(
    post,
    path = "/update-user-name",
    request_body = UpdateUserNameRequest,
    responses(
        (status = 200, description = "Name updated", body = UpdateUserNameResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "No active session for this email", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn update_user_name(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Json<UpdateUserNameRequest>>,
) -> impl IntoResponse {
    let request: UpdateUserNameRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return ApiError::Validation("Email and name are required".to_string()).into_response();
        }
    };

    let email = normalize_email(&request.email);
    let name = request.name.trim();
    if email.is_empty() || name.is_empty() {
        return ApiError::Validation("Email and name are required".to_string()).into_response();
    }
    let name_chars = name.chars().count();
    if name_chars < 2 {
        return ApiError::Validation("Name must be at least 2 characters".to_string())
            .into_response();
    }
    if name_chars > 50 {
        return ApiError::Validation("Name must be less than 50 characters".to_string())
            .into_response();
    }

    let session = match require_session(&headers, &pool).await {
        Ok(session) => session,
        Err(err) => return err.into_response(),
    };
    if session.email != email {
        // A valid session for someone else must not rename this account.
        return ApiError::Unauthorized.into_response();
    }

    match storage::update_user_name(&pool, session.user_id, name).await {
        Ok(Some(user)) => {
            let response = UpdateUserNameResponse {
                success: true,
                message: "Name updated successfully".to_string(),
                user: UserPayload {
                    id: user.id.to_string(),
                    email: user.email,
                    name: user.name,
                },
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => ApiError::UserNotFound.into_response(),
        Err(err) => {
            error!("Failed to update user name: {err}");
            ApiError::Internal.into_response()
        }
    }
}
