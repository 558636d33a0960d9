use std::sync::Arc;
use std::time::Duration;

use rioframe_catalog::{AssetStore, CatalogService};
use rioframe_core::rate_limit::{Clock, RateLimiter, SystemClock};
use rioframe_db::repositories::{ContactRepo, ProjectRepo};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The only write path to the project collection and the asset store.
    pub catalog: Arc<CatalogService>,
    pub contacts: Arc<ContactRepo>,
    pub config: Arc<ServerConfig>,
    /// Accepted contact submissions per client key.
    pub contact_limiter: Arc<RateLimiter>,
    /// Failed login attempts per client key.
    pub login_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build state whose rate limiters read time from `clock`.
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        let catalog = CatalogService::new(
            ProjectRepo::open(&config.data_dir),
            AssetStore::new(&config.uploads_dir, &config.uploads_url_prefix),
            config.transcode,
        );
        let contacts = ContactRepo::open(&config.data_dir);
        let contact_limiter = RateLimiter::with_clock(config.contact_policy(), Arc::clone(&clock));
        let login_limiter = RateLimiter::with_clock(config.login_policy(), clock);

        Self {
            catalog: Arc::new(catalog),
            contacts: Arc::new(contacts),
            config: Arc::new(config),
            contact_limiter: Arc::new(contact_limiter),
            login_limiter: Arc::new(login_limiter),
        }
    }

    /// Periodically drop expired rate-limit windows so the maps stay
    /// bounded by recently active clients.
    pub fn spawn_limiter_pruning(&self, every: Duration) -> JoinHandle<()> {
        let contact = Arc::clone(&self.contact_limiter);
        let login = Arc::clone(&self.login_limiter);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let removed = contact.prune() + login.prune();
                if removed > 0 {
                    tracing::debug!(removed, "Pruned expired rate-limit windows");
                }
            }
        })
    }
}
