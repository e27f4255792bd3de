//! Periodic sweeping of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info};

use authgate_core::result::AppResult;

use super::manager::SessionManager;

/// Background task that reclaims expired session records on a fixed interval.
#[derive(Debug, Clone)]
pub struct SessionSweeper {
    /// Manager whose store is swept.
    sessions: Arc<SessionManager>,
    /// Time between sweeps.
    interval: Duration,
}

impl SessionSweeper {
    /// Creates a sweeper that runs every `interval`.
    pub fn new(sessions: Arc<SessionManager>, interval: Duration) -> Self {
        Self { sessions, interval }
    }

    /// Creates a sweeper using the manager's configured interval.
    pub fn from_manager(sessions: Arc<SessionManager>) -> Self {
        let secs = sessions.config().sweep_interval_seconds.max(1);
        Self::new(sessions, Duration::from_secs(secs))
    }

    /// Runs a single sweep and returns the number of records removed.
    pub async fn run_once(&self) -> AppResult<u64> {
        let removed = self.sessions.sweep_expired().await?;
        if removed > 0 {
            info!(removed, "Expired sessions swept");
        } else {
            debug!("Session sweep found nothing to remove");
        }
        Ok(removed)
    }

    /// Sweeps on every tick until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Session sweeper started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "Session sweep failed");
                    }
                }
            }
        }

        info!("Session sweeper stopped");
    }

    /// Spawns [`SessionSweeper::run`] onto the runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}
