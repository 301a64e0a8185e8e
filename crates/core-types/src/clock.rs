use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::fmt::Debug;
use std::sync::RwLock;

/// The source of "now" for every timestamp the engine writes.
///
/// Swapping the clock is how tests freeze time: the engine never calls
/// `Utc::now()` directly.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time minus one minute.
    fn backdate(&self) -> DateTime<Utc>;
}

/// The wall clock. Instants are truncated to microseconds, which is the
/// precision PostgreSQL stores for `timestamptz`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    fn backdate(&self) -> DateTime<Utc> {
        self.now() - Duration::minutes(1)
    }
}

/// A clock frozen at a given instant until it is moved explicitly.
#[derive(Debug)]
pub struct MockClock {
    t: RwLock<DateTime<Utc>>,
}

impl MockClock {
    pub fn new(t: DateTime<Utc>) -> Self {
        Self { t: RwLock::new(t) }
    }

    /// Moves the clock to `t`.
    pub fn set(&self, t: DateTime<Utc>) {
        *self.t.write().unwrap_or_else(|e| e.into_inner()) = t;
    }

    /// Moves the clock forward by `d`.
    pub fn advance(&self, d: Duration) {
        let mut guard = self.t.write().unwrap_or_else(|e| e.into_inner());
        *guard += d;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.t.read().unwrap_or_else(|e| e.into_inner())
    }

    fn backdate(&self) -> DateTime<Utc> {
        self.now() - Duration::minutes(1)
    }
}
