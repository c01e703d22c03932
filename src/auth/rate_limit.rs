//! Fixed-window rate limiting per (client key, endpoint class) (§4.3).

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::auth::errors::RateLimitError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    Auth,
    GameAction,
    Query,
}

impl EndpointClass {
    fn window(self) -> (u32, Duration) {
        match self {
            EndpointClass::Auth => (10, Duration::from_secs(60)),
            EndpointClass::GameAction => (30, Duration::from_secs(10)),
            EndpointClass::Query => (100, Duration::from_secs(10)),
        }
    }
}

const COUNTER_IDLE_TTL: Duration = Duration::from_secs(300);

struct WindowCounter {
    window_start: Instant,
    count: u32,
}

/// Key identifying the bucket a request counts against: the client IP,
/// the authenticated wallet if any, and the endpoint class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientKey {
    pub ip: String,
    pub wallet: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct BucketKey {
    ip: String,
    wallet: Option<String>,
    class: EndpointClass,
}

pub struct RateLimiter {
    buckets: DashMap<BucketKey, WindowCounter>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    pub fn check(&self, key: &ClientKey, class: EndpointClass) -> Result<(), RateLimitError> {
        let (limit, window) = class.window();
        let bucket_key = BucketKey {
            ip: key.ip.clone(),
            wallet: key.wallet.clone(),
            class,
        };
        let now = Instant::now();

        let mut entry = self.buckets.entry(bucket_key).or_insert_with(|| WindowCounter {
            window_start: now,
            count: 0,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.window_start = now;
            entry.count = 0;
        }

        if entry.count >= limit {
            let elapsed = now.duration_since(entry.window_start);
            let retry_after = window.saturating_sub(elapsed);
            return Err(RateLimitError {
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }

        entry.count += 1;
        Ok(())
    }

    /// Drops buckets untouched for longer than [`COUNTER_IDLE_TTL`]. Meant
    /// to be called periodically by a background sweep task.
    pub fn sweep_idle(&self) {
        let now = Instant::now();
        self.buckets
            .retain(|_, counter| now.duration_since(counter.window_start) < COUNTER_IDLE_TTL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let limiter = RateLimiter::new();
        let key = ClientKey {
            ip: "127.0.0.1".into(),
            wallet: None,
        };
        for _ in 0..10 {
            limiter.check(&key, EndpointClass::Auth).unwrap();
        }
        let err = limiter.check(&key, EndpointClass::Auth).unwrap_err();
        assert!(err.retry_after_secs >= 1);
    }

    #[test]
    fn distinct_classes_have_independent_budgets() {
        let limiter = RateLimiter::new();
        let key = ClientKey {
            ip: "10.0.0.1".into(),
            wallet: Some("0xabc".into()),
        };
        for _ in 0..10 {
            limiter.check(&key, EndpointClass::Auth).unwrap();
        }
        // game-action budget is untouched by the auth-class exhaustion
        limiter.check(&key, EndpointClass::GameAction).unwrap();
    }
}
