//! Auth handlers and supporting modules.
//!
//! Login is passwordless: `/send-otp` emails a six-digit code, `/verify-otp`
//! consumes it and mints a server-side session. Sessions are bearer tokens
//! stored hashed in Postgres and doubled as an `HttpOnly` cookie.
//!
//! ## Code Lifecycle
//!
//! - Codes live in `otp_codes` with a TTL; several may exist per email and
//!   verification always targets the newest unexpired one.
//! - A code is removed on successful verification, after too many failed
//!   attempts, or by the cleanup sweep once expired.

mod otp;
pub(crate) mod profile;
mod rate_limit;
pub(crate) mod send_otp;
pub(crate) mod session;
mod state;
mod storage;
pub(crate) mod types;
mod utils;
pub(crate) mod verify_otp;

pub use rate_limit::NoopRateLimiter;
pub use state::{AuthConfig, AuthState};

#[cfg(test)]
pub(crate) mod tests;
