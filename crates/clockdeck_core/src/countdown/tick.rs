//! Periodic tick registrations.
//!
//! An engine registers at most one periodic tick at a time and identifies
//! deliveries by token, so a tick queued before a cancel can be recognised
//! as stale and dropped.

use std::collections::BTreeMap;
use std::time::Duration;

/// Identity of one periodic tick registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickToken(u64);

impl TickToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Provider of periodic ticks.
pub trait TickSource {
    /// Starts a periodic tick and returns its token.
    fn register(&mut self, interval: Duration) -> TickToken;
    /// Stops the tick. Must take effect before returning.
    fn cancel(&mut self, token: TickToken);
}

/// Tick source whose deliveries are driven by the host.
///
/// The host reads the active token and interval, runs its own periodic
/// timer, and feeds each firing back into the engine. Tests drive it the
/// same way.
#[derive(Debug, Default)]
pub struct HostTickSource {
    next_token: u64,
    active: BTreeMap<TickToken, Duration>,
    total_registrations: u64,
}

impl HostTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, token: TickToken) -> bool {
        self.active.contains_key(&token)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn interval(&self, token: TickToken) -> Option<Duration> {
        self.active.get(&token).copied()
    }

    /// Registrations ever made, including cancelled ones.
    pub fn total_registrations(&self) -> u64 {
        self.total_registrations
    }
}

impl TickSource for HostTickSource {
    fn register(&mut self, interval: Duration) -> TickToken {
        self.next_token += 1;
        self.total_registrations += 1;
        let token = TickToken(self.next_token);
        self.active.insert(token, interval);
        token
    }

    fn cancel(&mut self, token: TickToken) {
        self.active.remove(&token);
    }
}
