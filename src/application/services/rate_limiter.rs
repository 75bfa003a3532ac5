use governor::{
    clock::{Clock, DefaultClock},
    state::direct::NotKeyed,
    state::InMemoryState,
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::collections::HashMap;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio::sync::RwLock;

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Throttles login attempts per client.
///
/// Every attempt consumes one cell; a successful login resets the client.
/// A client gets `max_attempts` within any `window`. Once those are spent,
/// one more attempt is granted per full `window`.
/// Default: 5 attempts per 15 minutes.
#[derive(Clone)]
pub struct AuthRateLimiter {
    limiters: Arc<RwLock<HashMap<String, Arc<DirectLimiter>>>>,
    max_attempts: u32,
    window: Duration,
}

impl AuthRateLimiter {
    pub fn new() -> Self {
        Self::with_config(5, Duration::from_secs(15 * 60))
    }

    pub fn with_config(max_attempts: u32, window: Duration) -> Self {
        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window,
        }
    }

    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_attempts).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(self.window)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }

    /// Ok if the attempt may proceed, Err(wait) otherwise.
    pub async fn check(&self, client: &str) -> Result<(), Duration> {
        let key = client.to_lowercase();

        let limiter = {
            let mut limiters = self.limiters.write().await;
            limiters
                .entry(key)
                .or_insert_with(|| Arc::new(GovernorRateLimiter::direct(self.quota())))
                .clone()
        };

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(negative) => Err(negative.wait_time_from(DefaultClock::default().now())),
        }
    }

    pub async fn reset(&self, client: &str) {
        let mut limiters = self.limiters.write().await;
        limiters.remove(&client.to_lowercase());
    }

    /// Drop limiters that are back at full capacity.
    pub async fn cleanup(&self) {
        let mut limiters = self.limiters.write().await;
        let full = NonZeroU32::new(self.max_attempts).unwrap_or(NonZeroU32::MIN);
        limiters.retain(|_, limiter| limiter.check_n(full).map(|r| r.is_err()).unwrap_or(true));
    }

    pub async fn tracked_clients(&self) -> usize {
        self.limiters.read().await.len()
    }
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocks_after_max_attempts() {
        let limiter = AuthRateLimiter::with_config(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").await.is_ok());
        }
        let wait = limiter.check("10.0.0.1").await.unwrap_err();
        assert!(wait > Duration::ZERO);

        // Other clients are unaffected
        assert!(limiter.check("10.0.0.2").await.is_ok());
    }

    #[tokio::test]
    async fn test_spent_budget_stays_locked_for_the_window() {
        let limiter = AuthRateLimiter::with_config(5, Duration::from_millis(1000));
        for _ in 0..5 {
            assert!(limiter.check("10.0.0.1").await.is_ok());
        }

        tokio::time::sleep(Duration::from_millis(250)).await;
        let wait = limiter.check("10.0.0.1").await.unwrap_err();
        assert!(wait > Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_one_attempt_returns_after_the_window() {
        let limiter = AuthRateLimiter::with_config(2, Duration::from_millis(100));
        assert!(limiter.check("client").await.is_ok());
        assert!(limiter.check("client").await.is_ok());
        assert!(limiter.check("client").await.is_err());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(limiter.check("client").await.is_ok());
        assert!(limiter.check("client").await.is_err());
    }

    #[tokio::test]
    async fn test_reset_restores_attempts() {
        let limiter = AuthRateLimiter::with_config(1, Duration::from_secs(60));
        assert!(limiter.check("client").await.is_ok());
        assert!(limiter.check("client").await.is_err());

        limiter.reset("CLIENT").await;
        assert!(limiter.check("client").await.is_ok());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_throttled_clients() {
        let limiter = AuthRateLimiter::with_config(2, Duration::from_secs(60));
        limiter.check("busy").await.ok();
        limiter.check("busy").await.ok();
        assert_eq!(limiter.tracked_clients().await, 1);

        limiter.cleanup().await;
        assert_eq!(limiter.tracked_clients().await, 1);
    }
}
