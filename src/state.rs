use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::scheduler::ReviewScheduler;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    scheduler: Arc<ReviewScheduler>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: &Config, shutdown_tx: broadcast::Sender<()>) -> Self {
        let scheduler = ReviewScheduler::new(store.clone());
        Self::with_scheduler(store, scheduler, config, shutdown_tx)
    }

    /// State around a scheduler wired to its own stores.
    pub fn with_scheduler(
        store: Arc<Store>,
        scheduler: ReviewScheduler,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let scheduler = Arc::new(scheduler);
        Self {
            store,
            scheduler,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
