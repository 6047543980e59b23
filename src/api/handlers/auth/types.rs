//! Request/response types for auth endpoints.
//!
//! Response field names follow the camelCase wire format the web client
//! expects (`messageId`, `isExistingUser`, `expiresAt`).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub is_existing_user: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserPayload {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub token: String,
    pub expires_at: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub user: UserPayload,
    pub session: SessionPayload,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdateUserNameRequest {
    pub email: String,
    pub name: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdateUserNameResponse {
    pub success: bool,
    pub message: String,
    pub user: UserPayload,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user: UserPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn send_otp_response_uses_camel_case_keys() -> Result<()> {
        let response = SendOtpResponse {
            success: true,
            message: "OTP sent successfully".to_string(),
            email: "alice@example.com".to_string(),
            message_id: Some("re_123".to_string()),
            is_existing_user: false,
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("messageId").is_some());
        assert!(value.get("isExistingUser").is_some());
        assert!(value.get("message_id").is_none());
        Ok(())
    }

    #[test]
    fn send_otp_response_omits_missing_message_id() -> Result<()> {
        let response = SendOtpResponse {
            success: true,
            message: "OTP sent successfully".to_string(),
            email: "alice@example.com".to_string(),
            message_id: None,
            is_existing_user: true,
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("messageId").is_none());
        Ok(())
    }

    #[test]
    fn session_payload_round_trips() -> Result<()> {
        let payload = SessionPayload {
            token: "opaque-token".to_string(),
            expires_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&payload)?;
        let expires = value
            .get("expiresAt")
            .and_then(serde_json::Value::as_str)
            .context("missing expiresAt")?;
        assert_eq!(expires, "2026-01-01T00:00:00Z");
        let decoded: SessionPayload = serde_json::from_value(value)?;
        assert_eq!(decoded.token, "opaque-token");
        Ok(())
    }

    #[test]
    fn verify_otp_request_round_trips() -> Result<()> {
        let request = VerifyOtpRequest {
            email: "a@example.com".to_string(),
            otp: "482913".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let decoded: VerifyOtpRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.otp, "482913");
        Ok(())
    }
}
