//! Rate limiting hooks for the OTP endpoints.
//!
//! The server wires in [`NoopRateLimiter`]; real limiters implement
//! [`RateLimiter`] and slot in through [`super::AuthState`].

#[derive(Clone, Copy, Debug)]
pub enum RateLimitAction {
    SendOtp,
    VerifyOtp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

impl RateLimitDecision {
    #[must_use]
    pub fn is_limited(self) -> bool {
        matches!(self, Self::Limited)
    }
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
    fn check_email(&self, email: &str, action: RateLimitAction) -> RateLimitDecision;
}

/// Limiter that always allows; stands in until a real backend is configured.
#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }

    fn check_email(&self, _email: &str, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}
