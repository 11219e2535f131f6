//! Failed-login tracking and timed lockouts.
//!
//! Attempts are keyed by client network address. The accumulation window for
//! counting failures equals the lockout duration: a failure landing after the
//! window has drained restarts the count at one.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Per-identifier failure tracking.
#[derive(Debug, Clone)]
struct LockoutRecord {
    failed_attempts: u32,
    window_start: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

/// Outcome of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    /// Whether this failure triggered a lockout.
    pub locked: bool,
    /// Attempts remaining before a lockout (zero when locked).
    pub remaining_attempts: u32,
}

/// Tracks failed login attempts and enforces lockouts per client identifier.
///
/// One mutex over the map keeps each identifier's read-modify-write atomic;
/// the attempt counter is the correctness-critical value.
#[derive(Debug, Default)]
pub struct LockoutGuard {
    records: Mutex<HashMap<String, LockoutRecord>>,
}

impl LockoutGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the identifier is currently locked out.
    pub fn is_locked(&self, identifier: &str) -> bool {
        self.is_locked_at(identifier, Utc::now())
    }

    /// Clock-injectable form of [`is_locked`](Self::is_locked).
    pub fn is_locked_at(&self, identifier: &str, now: DateTime<Utc>) -> bool {
        self.records
            .lock()
            .unwrap()
            .get(identifier)
            .and_then(|record| record.locked_until)
            .is_some_and(|until| now < until)
    }

    /// Seconds until the identifier's lockout ends, clamped to zero.
    pub fn remaining_lock_secs(&self, identifier: &str) -> u64 {
        self.remaining_lock_secs_at(identifier, Utc::now())
    }

    /// Clock-injectable form of [`remaining_lock_secs`](Self::remaining_lock_secs).
    pub fn remaining_lock_secs_at(&self, identifier: &str, now: DateTime<Utc>) -> u64 {
        self.records
            .lock()
            .unwrap()
            .get(identifier)
            .and_then(|record| record.locked_until)
            .map(|until| (until - now).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    /// Record a failed attempt against the identifier.
    ///
    /// Increments the counter inside the current window; reaching
    /// `max_attempts` starts a lockout of `lockout_duration_minutes`.
    pub fn record_failed_attempt(
        &self,
        identifier: &str,
        max_attempts: u32,
        lockout_duration_minutes: u64,
    ) -> AttemptOutcome {
        self.record_failed_attempt_at(identifier, max_attempts, lockout_duration_minutes, Utc::now())
    }

    /// Clock-injectable form of [`record_failed_attempt`](Self::record_failed_attempt).
    pub fn record_failed_attempt_at(
        &self,
        identifier: &str,
        max_attempts: u32,
        lockout_duration_minutes: u64,
        now: DateTime<Utc>,
    ) -> AttemptOutcome {
        let window = Duration::minutes(lockout_duration_minutes as i64);
        let mut records = self.records.lock().unwrap();

        let record = records
            .entry(identifier.to_string())
            .or_insert(LockoutRecord {
                failed_attempts: 0,
                window_start: now,
                locked_until: None,
            });

        // An elapsed lockout or a drained window restarts the count.
        let stale = match record.locked_until {
            Some(until) => now >= until,
            None => now - record.window_start > window,
        };
        if stale {
            record.failed_attempts = 0;
            record.window_start = now;
            record.locked_until = None;
        }

        record.failed_attempts += 1;

        if record.failed_attempts >= max_attempts {
            record.locked_until = Some(now + Duration::minutes(lockout_duration_minutes as i64));
            warn!(
                identifier = %identifier,
                attempts = record.failed_attempts,
                lockout_minutes = lockout_duration_minutes,
                "Lockout started"
            );
            AttemptOutcome {
                locked: true,
                remaining_attempts: 0,
            }
        } else {
            let remaining = max_attempts - record.failed_attempts;
            debug!(
                identifier = %identifier,
                attempts = record.failed_attempts,
                remaining,
                "Recorded failed login attempt"
            );
            AttemptOutcome {
                locked: false,
                remaining_attempts: remaining,
            }
        }
    }

    /// Drop all tracking for the identifier (called after a successful login).
    pub fn clear_lockout(&self, identifier: &str) {
        self.records.lock().unwrap().remove(identifier);
    }

    /// Sweep records whose window and lockout have both passed.
    ///
    /// `window_minutes` is the current policy's lockout duration, which also
    /// bounds the accumulation window.
    pub fn cleanup(&self, window_minutes: u64) -> usize {
        self.cleanup_at(window_minutes, Utc::now())
    }

    /// Clock-injectable form of [`cleanup`](Self::cleanup).
    pub fn cleanup_at(&self, window_minutes: u64, now: DateTime<Utc>) -> usize {
        let window = Duration::minutes(window_minutes as i64);
        let mut records = self.records.lock().unwrap();

        let before = records.len();
        records.retain(|_, record| match record.locked_until {
            Some(until) => now < until,
            None => now - record.window_start <= window,
        });
        let removed = before - records.len();

        if removed > 0 {
            debug!(removed, "Cleaned up stale lockout records");
        }
        removed
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether no identifiers are tracked.
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP: &str = "10.0.0.1";

    #[test]
    fn test_no_record_not_locked() {
        let guard = LockoutGuard::new();
        assert!(!guard.is_locked(IP));
        assert_eq!(guard.remaining_lock_secs(IP), 0);
    }

    #[test]
    fn test_remaining_attempts_count_down() {
        let guard = LockoutGuard::new();

        for expected in (1..5).rev() {
            let outcome = guard.record_failed_attempt(IP, 5, 15);
            assert!(!outcome.locked);
            assert_eq!(outcome.remaining_attempts, expected);
        }
    }

    #[test]
    fn test_lockout_at_threshold() {
        let guard = LockoutGuard::new();
        let now = Utc::now();

        for _ in 0..4 {
            guard.record_failed_attempt_at(IP, 5, 15, now);
        }
        let outcome = guard.record_failed_attempt_at(IP, 5, 15, now);

        assert!(outcome.locked);
        assert_eq!(outcome.remaining_attempts, 0);
        assert!(guard.is_locked_at(IP, now));

        // Wait time is the full lockout duration.
        let secs = guard.remaining_lock_secs_at(IP, now);
        assert_eq!(secs, 15 * 60);
    }

    #[test]
    fn test_lockout_expires() {
        let guard = LockoutGuard::new();
        let now = Utc::now();

        for _ in 0..5 {
            guard.record_failed_attempt_at(IP, 5, 15, now);
        }
        assert!(guard.is_locked_at(IP, now + Duration::minutes(14)));
        assert!(!guard.is_locked_at(IP, now + Duration::minutes(15)));
        assert_eq!(
            guard.remaining_lock_secs_at(IP, now + Duration::minutes(16)),
            0
        );
    }

    #[test]
    fn test_failure_after_lockout_expiry_restarts_count() {
        let guard = LockoutGuard::new();
        let now = Utc::now();

        for _ in 0..5 {
            guard.record_failed_attempt_at(IP, 5, 15, now);
        }

        // Past the lockout, the next failure is attempt one of a new window.
        let later = now + Duration::minutes(16);
        let outcome = guard.record_failed_attempt_at(IP, 5, 15, later);
        assert!(!outcome.locked);
        assert_eq!(outcome.remaining_attempts, 4);
        assert!(!guard.is_locked_at(IP, later));
    }

    #[test]
    fn test_window_drain_restarts_count() {
        let guard = LockoutGuard::new();
        let now = Utc::now();

        guard.record_failed_attempt_at(IP, 5, 15, now);
        guard.record_failed_attempt_at(IP, 5, 15, now + Duration::minutes(1));

        // 16 minutes after the window opened, the count restarts.
        let outcome = guard.record_failed_attempt_at(IP, 5, 15, now + Duration::minutes(16));
        assert!(!outcome.locked);
        assert_eq!(outcome.remaining_attempts, 4);
    }

    #[test]
    fn test_clear_lockout_resets() {
        let guard = LockoutGuard::new();

        guard.record_failed_attempt(IP, 5, 15);
        guard.record_failed_attempt(IP, 5, 15);
        guard.clear_lockout(IP);

        assert!(guard.is_empty());
        let outcome = guard.record_failed_attempt(IP, 5, 15);
        assert_eq!(outcome.remaining_attempts, 4);
    }

    #[test]
    fn test_identifiers_are_independent() {
        let guard = LockoutGuard::new();
        let now = Utc::now();

        for _ in 0..5 {
            guard.record_failed_attempt_at("10.0.0.1", 5, 15, now);
        }

        assert!(guard.is_locked_at("10.0.0.1", now));
        assert!(!guard.is_locked_at("10.0.0.2", now));
        let outcome = guard.record_failed_attempt_at("10.0.0.2", 5, 15, now);
        assert_eq!(outcome.remaining_attempts, 4);
    }

    #[test]
    fn test_max_attempts_one_locks_immediately() {
        let guard = LockoutGuard::new();
        let outcome = guard.record_failed_attempt(IP, 1, 15);
        assert!(outcome.locked);
        assert!(guard.is_locked(IP));
    }

    #[test]
    fn test_cleanup_drops_stale_records() {
        let guard = LockoutGuard::new();
        let now = Utc::now();

        // Locked record, fresh window record, stale window record.
        for _ in 0..5 {
            guard.record_failed_attempt_at("locked", 5, 15, now);
        }
        guard.record_failed_attempt_at("fresh", 5, 15, now + Duration::minutes(10));
        guard.record_failed_attempt_at("stale", 5, 15, now - Duration::minutes(30));

        let removed = guard.cleanup_at(15, now + Duration::minutes(11));

        assert_eq!(removed, 1);
        assert_eq!(guard.len(), 2);

        // After the lockout passes too, only the fresh window survives.
        let removed = guard.cleanup_at(15, now + Duration::minutes(16));
        assert_eq!(removed, 1);
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn test_concurrent_failures_single_lockout() {
        use std::sync::Arc;

        let guard = Arc::new(LockoutGuard::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let guard = guard.clone();
                std::thread::spawn(move || guard.record_failed_attempt(IP, 5, 15))
            })
            .collect();

        let locked = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| o.locked)
            .count();

        // All ten increments land; every outcome at or past the threshold
        // reports locked, and the guard agrees.
        assert!(locked >= 1);
        assert!(guard.is_locked(IP));
    }
}
