use crate::shutdown::{Cancelled, Shutdown};

// plc.directory allows 500 requests per five minutes; stay a bit under it.
pub const DEFAULT_RATE: f64 = 450.0 / 300.0;
pub const CAUGHT_UP_RATE: f64 = 0.2;
pub const CAUGHT_UP_THRESHOLD: time::Duration = time::Duration::minutes(10);

const BURST: std::num::NonZeroU32 = match std::num::NonZeroU32::new(4) {
    Some(burst) => burst,
    None => panic!("burst must be nonzero"),
};
const RATE_EPSILON: f64 = 0.0000001;

type RateLimiter = governor::DefaultDirectRateLimiter;

fn limiter(rate: f64) -> RateLimiter {
    let quota = governor::Quota::with_period(std::time::Duration::from_secs_f64(1.0 / rate))
        .unwrap_or_else(|| governor::Quota::per_second(BURST))
        .allow_burst(BURST);
    governor::RateLimiter::direct(quota)
}

/// Picks the request rate for the freshness of the newest observed record.
/// Once caught up, requests slow down so new records arrive in larger pages.
pub fn desired_rate(last_record: time::OffsetDateTime, now: time::OffsetDateTime) -> f64 {
    if now - last_record < CAUGHT_UP_THRESHOLD {
        CAUGHT_UP_RATE
    } else {
        DEFAULT_RATE
    }
}

/// Token bucket for upstream requests, owned by the ingestion worker.
pub struct RateGovernor {
    rate: f64,
    limiter: RateLimiter,
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            limiter: limiter(DEFAULT_RATE),
        }
    }
}

impl RateGovernor {
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn observe(&mut self, last_record: time::OffsetDateTime, now: time::OffsetDateTime) {
        let desired = desired_rate(last_record, now);
        if (self.rate - desired).abs() > RATE_EPSILON {
            tracing::info!(from = self.rate, to = desired, "changing upstream request rate");
            self.rate = desired;
            // governor has no in-place quota change; the new limiter starts
            // with a full burst.
            self.limiter = limiter(desired);
        }
    }

    pub async fn acquire(&self, shutdown: &Shutdown) -> Result<(), Cancelled> {
        shutdown
            .run_until_cancelled(self.limiter.until_ready())
            .await
    }
}
