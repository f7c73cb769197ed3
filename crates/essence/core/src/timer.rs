//! Wall-clock timestamps and lazily evaluated expiry tables.
//!
//! Nothing here runs on a timer. Every expiry is compared against the `now`
//! supplied by the caller, and stale entries are dropped when they are read.
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Time elapsed since `earlier`, zero if `earlier` lies in the future.
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Absolute expiry per key. Absence means "not running".
///
/// An entry counts as expired once `now >= expiry`.
#[derive(Clone, Debug)]
pub struct ExpiryTable<K> {
    entries: HashMap<K, Timestamp>,
}

impl<K: Eq + Hash + Copy> ExpiryTable<K> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Starts (or restarts) the timer for `key`; returns the expiry.
    pub fn start(&mut self, key: K, now: Timestamp, duration: Duration) -> Timestamp {
        let expiry = now.saturating_add(duration);
        self.entries.insert(key, expiry);
        expiry
    }

    /// Remaining time for `key`, clearing the entry when it has expired.
    pub fn remaining(&mut self, key: K, now: Timestamp) -> Option<Duration> {
        let expiry = *self.entries.get(&key)?;
        if now >= expiry {
            self.entries.remove(&key);
            return None;
        }
        Some(expiry.saturating_since(now))
    }

    pub fn is_running(&mut self, key: K, now: Timestamp) -> bool {
        self.remaining(key, now).is_some()
    }

    pub fn expiry(&self, key: K) -> Option<Timestamp> {
        self.entries.get(&key).copied()
    }

    pub fn clear(&mut self, key: K) {
        self.entries.remove(&key);
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + Copy> Default for ExpiryTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a remaining duration as `45s` or `2m 5s`, rounding up to whole seconds.
pub fn format_remaining(remaining: &Duration) -> String {
    let mut seconds = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        seconds += 1;
    }
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}
