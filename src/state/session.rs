//! Process-wide session indicators: connectivity and latest statistics.
//!
//! DESIGN
//! ======
//! Both are thin wrappers over `tokio::sync::watch` so a renderer can either
//! read the current value or await changes. They are created once in `main`
//! and handed to whoever needs them; there are no globals.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::net::types::Stats;

/// Whether the answering service answered the last health check.
#[derive(Clone, Debug)]
pub struct ConnectivityState {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityState {
    /// Starts disconnected until the first health check completes.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set_connected(&self, connected: bool) {
        self.tx.send_replace(connected);
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Latest statistics payload, absent until the first successful load.
#[derive(Clone, Debug)]
pub struct StatsState {
    tx: Arc<watch::Sender<Option<Stats>>>,
}

impl Default for StatsState {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsState {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn current(&self) -> Option<Stats> {
        self.tx.borrow().clone()
    }

    /// Replace the displayed statistics. Failed loads never call this.
    pub fn publish(&self, stats: Stats) {
        self.tx.send_replace(Some(stats));
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Stats>> {
        self.tx.subscribe()
    }
}
