//! Authoritative session registry.
//!
//! The in-memory record of currently active admin sessions. A token whose
//! signature still verifies may nevertheless be dead here; the registry, not
//! the token, is the source of truth for revocation. Nothing is persisted; a
//! restart invalidates all sessions and forces re-authentication.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// Facts about one active session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Username the session was issued to.
    pub username: String,
    /// When the session was created.
    pub issued_at: DateTime<Utc>,
    /// Last verified access (drives the idle timeout).
    pub last_seen_at: DateTime<Utc>,
}

/// Registry of active sessions, keyed by token.
///
/// One mutex over the whole map; every operation is a short critical section
/// and reads/writes are linearizable.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    idle_timeout_minutes: Mutex<u64>,
}

impl SessionRegistry {
    /// Create a registry with the given idle timeout.
    pub fn new(idle_timeout_minutes: u64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout_minutes: Mutex::new(idle_timeout_minutes),
        }
    }

    /// Record a new active session.
    pub fn create(&self, username: &str, token: &str) {
        let now = Utc::now();
        let record = SessionRecord {
            username: username.to_string(),
            issued_at: now,
            last_seen_at: now,
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), record);
        info!(username = %username, "Session created");
    }

    /// Confirm a session is still live and refresh its activity timestamp.
    ///
    /// Returns `false` when no record exists or the record sat idle past the
    /// configured timeout; an expired record is evicted on the spot.
    pub fn touch(&self, token: &str) -> bool {
        self.touch_at(token, Utc::now())
    }

    /// Clock-injectable form of [`touch`](Self::touch).
    pub fn touch_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let timeout = Duration::minutes(*self.idle_timeout_minutes.lock().unwrap() as i64);
        let mut sessions = self.sessions.lock().unwrap();

        match sessions.get_mut(token) {
            Some(record) => {
                if now - record.last_seen_at > timeout {
                    let username = record.username.clone();
                    sessions.remove(token);
                    debug!(username = %username, "Session expired on touch");
                    false
                } else {
                    record.last_seen_at = now;
                    true
                }
            }
            None => false,
        }
    }

    /// Remove a session unconditionally. Idempotent.
    pub fn delete(&self, token: &str) {
        if let Some(record) = self.sessions.lock().unwrap().remove(token) {
            info!(username = %record.username, "Session deleted");
        }
    }

    /// Change the idle timeout applied to subsequent touches.
    ///
    /// Sessions already past the old threshold stay in the map until their
    /// next touch or a cleanup sweep.
    pub fn update_policy(&self, timeout_minutes: u64) {
        *self.idle_timeout_minutes.lock().unwrap() = timeout_minutes;
        debug!(timeout_minutes, "Session idle timeout updated");
    }

    /// The currently applied idle timeout in minutes.
    pub fn idle_timeout_minutes(&self) -> u64 {
        *self.idle_timeout_minutes.lock().unwrap()
    }

    /// Look up a session without refreshing its activity timestamp.
    pub fn get(&self, token: &str) -> Option<SessionRecord> {
        self.sessions.lock().unwrap().get(token).cloned()
    }

    /// Sweep expired sessions. Returns the number removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Utc::now())
    }

    /// Clock-injectable form of [`cleanup`](Self::cleanup).
    pub fn cleanup_at(&self, now: DateTime<Utc>) -> usize {
        let timeout = Duration::minutes(*self.idle_timeout_minutes.lock().unwrap() as i64);
        let mut sessions = self.sessions.lock().unwrap();

        let before = sessions.len();
        sessions.retain(|_, record| now - record.last_seen_at <= timeout);
        let removed = before - sessions.len();

        if removed > 0 {
            debug!(removed, "Cleaned up expired sessions");
        }
        removed
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Whether the registry holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}
