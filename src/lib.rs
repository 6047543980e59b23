//! # Avizo (Community Incident Reporting)
//!
//! `avizo` is the backend for a community safety map: users report hazards
//! (flooding, fallen trees, blocked roads) pinned to a location, and sign in
//! with one-time codes sent by email instead of passwords.
//!
//! ## Passwordless Authentication
//!
//! Login is a two-step OTP flow:
//!
//! - `POST /send-otp` emails a 6-digit code valid for 30 minutes.
//! - `POST /verify-otp` consumes the code atomically, enforcing a 3-attempt
//!   limit, and establishes a ~30 day session.
//!
//! Codes are drawn uniformly from the OS CSPRNG and each code is usable at
//! most once. The database stores only the SHA-256 hash of session tokens.
//!
//! ## Incident Lifecycle
//!
//! Reports are created `active` with an expiry timestamp and flipped to
//! `expired` by an idempotent sweep (`POST /jobs/expire-incidents`) meant to
//! be triggered by an external scheduler. A companion sweep removes stale
//! one-time codes.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
