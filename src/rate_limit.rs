use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Contact form sends allowed per client IP per window.
pub const CONTACT_LIMIT: u32 = 5;
pub const CONTACT_WINDOW_SECS: u64 = 60 * 60;

const LOGIN_MAX_FAILURES: u32 = 5;
const LOGIN_WINDOW_SECS: u64 = 15 * 60;

/// Per-IP contact form limiter using a fixed window.
pub struct ContactRateLimiter {
    /// ip -> (count, window_start)
    entries: DashMap<IpAddr, (u32, Instant)>,
}

impl ContactRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if a send is allowed and count it. Returns Err with retry-after seconds.
    pub fn check(&self, ip: IpAddr, limit: u32, window_secs: u64) -> Result<(), u64> {
        self.check_at(ip, limit, window_secs, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, limit: u32, window_secs: u64, now: Instant) -> Result<(), u64> {
        let window = Duration::from_secs(window_secs);

        let mut entry = self.entries.entry(ip).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= limit {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(window_secs.saturating_sub(elapsed));
        }

        *count += 1;
        Ok(())
    }

    /// Remove stale entries older than the given duration.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

impl Default for ContactRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-email login brute force limiter.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if a login attempt is allowed. 5 failures per 15 minutes.
    /// Does NOT increment the counter; call `record_failure()` on a bad password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let window = Duration::from_secs(LOGIN_WINDOW_SECS);
        let now = Instant::now();

        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };
        let (count, start) = entry.value();

        if now.duration_since(*start) > window {
            return Ok(());
        }

        if *count >= LOGIN_MAX_FAILURES {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(LOGIN_WINDOW_SECS.saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record_failure(&self, email: &str) {
        let window = Duration::from_secs(LOGIN_WINDOW_SECS);
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(email.to_lowercase())
            .or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget failures after a successful login.
    pub fn reset(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_limit_blocks_after_limit() {
        let limiter = ContactRateLimiter::new();
        let ip: IpAddr = "203.0.113.7".parse().unwrap();

        for _ in 0..3 {
            assert!(limiter.check(ip, 3, 60).is_ok());
        }
        let retry = limiter.check(ip, 3, 60).unwrap_err();
        assert!(retry <= 60);

        let other: IpAddr = "203.0.113.8".parse().unwrap();
        assert!(limiter.check(other, 3, 60).is_ok());
    }

    #[test]
    fn contact_window_resets() {
        let limiter = ContactRateLimiter::new();
        let ip: IpAddr = "203.0.113.7".parse().unwrap();
        let start = Instant::now();

        assert!(limiter.check_at(ip, 1, 10, start).is_ok());
        assert!(limiter.check_at(ip, 1, 10, start).is_err());
        assert!(
            limiter
                .check_at(ip, 1, 10, start + Duration::from_secs(11))
                .is_ok()
        );
    }

    #[test]
    fn login_failures_lock_out_case_insensitively() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..LOGIN_MAX_FAILURES {
            assert!(limiter.check("ada@example.com").is_ok());
            limiter.record_failure("Ada@Example.com");
        }

        assert!(limiter.check("ada@example.com").is_err());
        limiter.reset("ADA@example.com");
        assert!(limiter.check("ada@example.com").is_ok());
    }
}
