use crate::storage::SessionStore;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Clone, Debug)]
struct Metrics {
    expired_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("canva-connect-server");
        Self {
            expired_total: meter
                .u64_counter("sessions_expired_total")
                .with_description("Total idle sessions evicted from the store")
                .build(),
        }
    }
}

/// Periodically evicts idle sessions so abandoned browsers do not accumulate.
#[derive(Debug)]
pub struct SessionSweeper {
    store: Arc<dyn SessionStore>,
    sweep_interval_secs: u64,
    metrics: Metrics,
}

impl SessionSweeper {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, sweep_interval_secs: u64) -> Self {
        Self { store, sweep_interval_secs, metrics: Metrics::new() }
    }

    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        if self.sweep_interval_secs == 0 {
            tracing::info!("Session sweeper is disabled (interval = 0)");
            return;
        }

        let mut interval = tokio::time::interval(Duration::from_secs(self.sweep_interval_secs));

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep().instrument(tracing::info_span!("run_session_sweep")).await;
                }
                _ = shutdown.changed() => {}
            }
        }
        tracing::info!("Session sweeper shutting down...");
    }

    /// Removes every expired session once, returning how many were evicted.
    pub async fn sweep(&self) -> usize {
        let removed = self.store.purge_expired().await;
        if removed > 0 {
            tracing::info!(count = removed, "Evicted expired sessions");
            self.metrics.expired_total.add(u64::try_from(removed).unwrap_or(u64::MAX), &[]);
        }
        removed
    }
}
