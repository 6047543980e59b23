//! API handlers for Avizo.
//!
//! Routes are grouped by concern: passwordless authentication under `auth`,
//! incident reports and sweeps under `incidents`, plus the service-level
//! `root` and `health` endpoints.

pub mod auth;
pub mod health;
pub mod incidents;
pub mod root;
