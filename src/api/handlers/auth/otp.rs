//! One-time code generation.

use anyhow::{Context, Result};
use rand::{RngCore, rngs::OsRng};

const OTP_MIN: u32 = 100_000;
const OTP_RANGE: u32 = 900_000;
// Largest multiple of OTP_RANGE representable in u32. Draws at or above this
// are rejected so the modulo below cannot skew toward low codes.
const REJECTION_LIMIT: u32 = u32::MAX - (u32::MAX % OTP_RANGE);

/// Generate a uniformly distributed six-digit one-time code.
///
/// Codes cover `100000..=999999`, so they never need zero padding and a
/// truncated code cannot alias another valid one.
pub(super) fn generate_otp_code() -> Result<String> {
    loop {
        let mut bytes = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("failed to generate one-time code")?;
        let value = u32::from_be_bytes(bytes);
        if value < REJECTION_LIMIT {
            return Ok((OTP_MIN + value % OTP_RANGE).to_string());
        }
    }
}
