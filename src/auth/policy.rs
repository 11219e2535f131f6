//! Security policy shared across the authentication subsystem.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Operator-tunable security thresholds.
///
/// Loaded from configuration at startup and replaceable at runtime through
/// the settings API without a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Idle timeout for sessions in minutes.
    pub session_timeout_minutes: u64,
    /// Failed login attempts allowed before a lockout.
    pub max_login_attempts: u32,
    /// Lockout duration in minutes.
    pub lockout_duration_minutes: u64,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 60,
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
        }
    }
}

/// Shared, hot-swappable handle to the current security policy.
///
/// Read-mostly: login requests read the policy on each attempt, settings
/// updates replace the whole value.
#[derive(Debug, Clone)]
pub struct PolicyHandle {
    inner: Arc<RwLock<SecurityPolicy>>,
}

impl PolicyHandle {
    /// Create a handle holding the given policy.
    pub fn new(policy: SecurityPolicy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(policy)),
        }
    }

    /// Get a copy of the current policy.
    pub fn get(&self) -> SecurityPolicy {
        *self.inner.read().unwrap()
    }

    /// Replace the current policy.
    pub fn set(&self, policy: SecurityPolicy) {
        *self.inner.write().unwrap() = policy;
    }
}

impl Default for PolicyHandle {
    fn default() -> Self {
        Self::new(SecurityPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = SecurityPolicy::default();
        assert_eq!(policy.session_timeout_minutes, 60);
        assert_eq!(policy.max_login_attempts, 5);
        assert_eq!(policy.lockout_duration_minutes, 15);
    }

    #[test]
    fn test_policy_handle_swap() {
        let handle = PolicyHandle::default();
        assert_eq!(handle.get().max_login_attempts, 5);

        handle.set(SecurityPolicy {
            session_timeout_minutes: 30,
            max_login_attempts: 3,
            lockout_duration_minutes: 5,
        });

        let policy = handle.get();
        assert_eq!(policy.session_timeout_minutes, 30);
        assert_eq!(policy.max_login_attempts, 3);
        assert_eq!(policy.lockout_duration_minutes, 5);
    }

    #[test]
    fn test_policy_handle_clone_shares_state() {
        let handle = PolicyHandle::default();
        let clone = handle.clone();

        handle.set(SecurityPolicy {
            session_timeout_minutes: 10,
            max_login_attempts: 2,
            lockout_duration_minutes: 1,
        });

        assert_eq!(clone.get().max_login_attempts, 2);
    }

    #[test]
    fn test_policy_serde_roundtrip() {
        let policy = SecurityPolicy::default();
        let json = serde_json::to_string(&policy).unwrap();
        let parsed: SecurityPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, policy);
    }
}
