use std::sync::Arc;

use slotkeeper_core::Roster;
use slotkeeper_events::{Messenger, RestoreScheduler, SharedRoster};
use tokio::sync::Mutex;

use crate::config::AppConfig;

/// Shared application state available to the dispatcher and Axum handlers.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// All players, positions and building entries, behind one lock.
    pub roster: SharedRoster,
    /// Restore notification tasks.
    pub scheduler: Arc<RestoreScheduler>,
    /// Outbound delivery channel.
    pub messenger: Arc<dyn Messenger>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build fresh, empty state. Nothing survives a restart.
    pub fn new(config: AppConfig, messenger: Arc<dyn Messenger>) -> Self {
        let roster: SharedRoster =
            Arc::new(Mutex::new(Roster::new(config.bot.restore_cooldown())));
        let scheduler = Arc::new(RestoreScheduler::new(
            Arc::clone(&roster),
            Arc::clone(&messenger),
        ));

        Self {
            roster,
            scheduler,
            messenger,
            config: Arc::new(config),
        }
    }
}
