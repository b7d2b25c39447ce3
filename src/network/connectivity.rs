//! # Connectivity Monitor
//!
//! Tracks whether the process is online. The state is pushed in by
//! platform network-change signals (`set_online`); nothing here polls.
//! Interested components either read the state synchronously or
//! `subscribe()` to transitions.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Binary connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn from_online(online: bool) -> Self {
        if online {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == Connectivity::Online
    }
}

/// Process-wide connectivity state with change notifications
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    state: Arc<watch::Sender<Connectivity>>,
}

impl ConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state: Arc::new(state),
        }
    }

    /// Current state
    pub fn current(&self) -> Connectivity {
        *self.state.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.current().is_online()
    }

    /// Record a platform connectivity signal
    ///
    /// Returns `true` when the state actually changed; subscribers are only
    /// notified on change.
    pub fn set(&self, next: Connectivity) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            tracing::info!("[Connectivity] now {:?}", next);
        }
        changed
    }

    pub fn set_online(&self, online: bool) -> bool {
        self.set(Connectivity::from_online(online))
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transitions_notify_subscribers() {
        let monitor = ConnectivityMonitor::new(Connectivity::Offline);
        let mut rx = monitor.subscribe();

        assert!(monitor.set_online(true));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Connectivity::Online);
        assert!(monitor.is_online());
    }

    #[tokio::test]
    async fn test_repeated_signal_is_not_a_transition() {
        let monitor = ConnectivityMonitor::new(Connectivity::Online);
        let rx = monitor.subscribe();

        assert!(!monitor.set_online(true));
        assert!(!rx.has_changed().unwrap());
    }
}
