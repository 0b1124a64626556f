// src/core/connectivity.rs
//! Network reachability gate.
//!
//! A platform path monitor owns the [`ConnectivityObserver`] and reports
//! status changes; every flow holds a read-only [`ConnectivityGate`] and
//! checks it before building a request. Values are only as fresh as the last
//! report (no polling).

use tokio::sync::watch;
use tracing::info;

use crate::error::ApiError;

/// Status of the current network path as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    Satisfied,
    Unsatisfied,
    RequiresConnection,
}

/// Writer side. Only the path monitor callback should hold this.
#[derive(Debug)]
pub struct ConnectivityObserver {
    tx: watch::Sender<bool>,
}

/// Reader side, cheap to clone.
#[derive(Debug, Clone)]
pub struct ConnectivityGate {
    rx: watch::Receiver<bool>,
}

/// Create a linked observer/gate pair. Starts as `initial`.
pub fn connectivity(initial: bool) -> (ConnectivityObserver, ConnectivityGate) {
    let (tx, rx) = watch::channel(initial);
    (ConnectivityObserver { tx }, ConnectivityGate { rx })
}

impl ConnectivityObserver {
    pub fn report(&self, connected: bool) {
        let previous = self.tx.send_replace(connected);
        if previous != connected {
            info!(
                "Network {}",
                if connected { "reachable" } else { "unreachable" }
            );
        }
    }

    pub fn report_path(&self, status: PathStatus) {
        self.report(status == PathStatus::Satisfied);
    }

    pub fn gate(&self) -> ConnectivityGate {
        ConnectivityGate {
            rx: self.tx.subscribe(),
        }
    }
}

impl ConnectivityGate {
    /// Gate for environments without a path monitor; always reports online.
    pub fn always_online() -> Self {
        let (_observer, gate) = connectivity(true);
        gate
    }

    pub fn is_connected(&self) -> bool {
        *self.rx.borrow()
    }

    /// Fail fast with `NetworkError("No internet connection")` when offline.
    pub fn ensure_connected(&self) -> Result<(), ApiError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ApiError::offline())
        }
    }

    /// Wait for the next reported change. `None` once the observer is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_follows_reports() {
        let (observer, gate) = connectivity(true);
        assert!(gate.is_connected());
        assert!(gate.ensure_connected().is_ok());

        observer.report_path(PathStatus::Unsatisfied);
        assert!(!gate.is_connected());
        let err = gate.ensure_connected().unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.to_string(), "No internet connection");

        observer.report_path(PathStatus::Satisfied);
        assert!(gate.is_connected());
    }

    #[test]
    fn test_requires_connection_counts_as_offline() {
        let (observer, gate) = connectivity(true);
        observer.report_path(PathStatus::RequiresConnection);
        assert!(!gate.is_connected());
    }

    #[test]
    fn test_always_online_survives_observer_drop() {
        let gate = ConnectivityGate::always_online();
        assert!(gate.is_connected());
    }

    #[tokio::test]
    async fn test_changed_delivers_updates() {
        let (observer, gate) = connectivity(true);
        let mut watcher = gate.clone();
        let second = observer.gate();

        observer.report(false);
        assert_eq!(watcher.changed().await, Some(false));
        assert!(!second.is_connected());

        drop(observer);
        assert_eq!(watcher.changed().await, None);
    }
}
