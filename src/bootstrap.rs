//! Session bootstrap: reachability check and statistics load.
//!
//! DESIGN
//! ======
//! Both startup calls run as independent tasks; neither waits on the other
//! and neither blocks the conversation store. There is no retry loop. A
//! failed health check flips the connectivity flag to `false`, a failed
//! stats load leaves the previous statistics in place, and both are only
//! logged. Recovery is an explicit re-check or a reload.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod bootstrap_test;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::net::api::AnswerService;
use crate::net::error::ApiError;
use crate::state::chat::StatsRefreshHook;
use crate::state::session::{ConnectivityState, StatsState};

#[derive(Clone)]
pub struct SessionBootstrap {
    service: Arc<dyn AnswerService>,
    connectivity: ConnectivityState,
    stats: StatsState,
}

/// Handles for the two startup tasks.
pub struct StartupTasks {
    pub health: JoinHandle<bool>,
    pub stats: JoinHandle<bool>,
}

impl SessionBootstrap {
    #[must_use]
    pub fn new(service: Arc<dyn AnswerService>, connectivity: ConnectivityState, stats: StatsState) -> Self {
        Self { service, connectivity, stats }
    }

    #[must_use]
    pub fn connectivity(&self) -> &ConnectivityState {
        &self.connectivity
    }

    #[must_use]
    pub fn stats(&self) -> &StatsState {
        &self.stats
    }

    /// Spawn the health check and the stats load side by side.
    #[must_use]
    pub fn start(&self) -> StartupTasks {
        let health = {
            let this = self.clone();
            tokio::spawn(async move { this.check_connection().await })
        };
        let stats = {
            let this = self.clone();
            tokio::spawn(async move { this.load_stats().await })
        };
        StartupTasks { health, stats }
    }

    /// Probe the service and record the result. Returns the new flag.
    pub async fn check_connection(&self) -> bool {
        let connected = match self.service.health_check().await {
            Ok(_) => {
                info!("answering service reachable");
                true
            }
            Err(e) => {
                warn!(error = %e, "connection failed");
                false
            }
        };
        self.connectivity.set_connected(connected);
        connected
    }

    /// Fetch statistics and publish them. Returns whether they were replaced.
    pub async fn load_stats(&self) -> bool {
        match self.service.get_stats().await {
            Ok(stats) => {
                self.stats.publish(stats);
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to load stats");
                false
            }
        }
    }

    /// Hook for the conversation store: reload stats after each answer.
    ///
    /// The hook spawns, so it must be invoked inside a Tokio runtime.
    #[must_use]
    pub fn stats_refresh_hook(&self) -> StatsRefreshHook {
        let this = self.clone();
        Arc::new(move || {
            let this = this.clone();
            tokio::spawn(async move { this.load_stats().await });
        })
    }

    /// Ask the backend to re-index, then reload statistics.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ApiError::Index`] when the backend refuses.
    pub async fn trigger_indexing(&self) -> Result<serde_json::Value, ApiError> {
        match self.service.trigger_indexing().await {
            Ok(ack) => {
                info!("indexing completed");
                self.load_stats().await;
                Ok(ack)
            }
            Err(e) => {
                warn!(error = %e, "indexing failed");
                Err(e)
            }
        }
    }
}
