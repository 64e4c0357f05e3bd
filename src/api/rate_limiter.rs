use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use std::num::NonZeroU32;

/// Shared request budget for every worker hitting the same API.
pub struct RateLimiter {
    limiter: Option<GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: Option<u32>) -> Self {
        let limiter = requests_per_minute
            .and_then(NonZeroU32::new)
            .map(|rpm| GovRateLimiter::direct(Quota::per_minute(rpm)));
        Self { limiter }
    }

    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }

    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
