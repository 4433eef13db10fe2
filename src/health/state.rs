//! Data-store connectivity state machine.
//!
//! # States
//! - Connecting: initial, the probe has not resolved yet
//! - Connected: last connection attempt succeeded and the socket held
//! - Disconnected: last attempt failed, or an established socket dropped
//!
//! # State Transitions
//! ```text
//! Connecting → Connected     successful connect within the selection timeout
//! Connecting → Disconnected  connect failure or timeout
//! Connected  → Disconnected  established socket closed or errored
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// Connectivity of the backing data store, as last observed by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Connecting = 0,
    Connected = 1,
    Disconnected = 2,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ConnectionState::Connected,
            2 => ConnectionState::Disconnected,
            _ => ConnectionState::Connecting,
        }
    }
}

/// Point-in-time view served by the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealthSnapshot {
    pub connected: bool,
    pub status: &'static str,
}

/// Single process-wide cell holding the dependency state.
///
/// Written only through [`DependencyHealth::record_transition`] by the
/// probe task; request handlers only read it. Atomic, so observing never
/// blocks regardless of true connectivity.
#[derive(Debug)]
pub struct DependencyHealth {
    state: AtomicU8,
}

impl DependencyHealth {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Connecting as u8),
        }
    }

    /// Last recorded state.
    pub fn observe(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Publish a transition. Logs only when the state actually changes.
    pub fn record_transition(&self, next: ConnectionState) {
        let prev = ConnectionState::from_u8(self.state.swap(next as u8, Ordering::AcqRel));
        if prev != next {
            tracing::info!(from = prev.as_str(), to = next.as_str(), "Dependency state changed");
        }
    }

    /// Snapshot for the health endpoint body.
    pub fn snapshot(&self) -> HealthSnapshot {
        let state = self.observe();
        HealthSnapshot {
            connected: state.is_connected(),
            status: state.as_str(),
        }
    }
}

impl Default for DependencyHealth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting() {
        let health = DependencyHealth::new();
        assert_eq!(health.observe(), ConnectionState::Connecting);
        let snap = health.snapshot();
        assert!(!snap.connected);
        assert_eq!(snap.status, "connecting");
    }

    #[test]
    fn transitions_are_observed() {
        let health = DependencyHealth::new();
        health.record_transition(ConnectionState::Connected);
        assert!(health.snapshot().connected);
        assert_eq!(health.snapshot().status, "connected");

        health.record_transition(ConnectionState::Disconnected);
        assert!(!health.snapshot().connected);
        assert_eq!(health.snapshot().status, "disconnected");
    }
}
