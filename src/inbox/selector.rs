//! Transport selector — chooses which adapter backs the pipeline.
//!
//! Switching never moves state between adapters: whatever accumulated in
//! the other adapter's memory stays there.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use super::adapter::InboxBackend;
use crate::config::TransportMode;

pub struct TransportSelector {
    mode: RwLock<TransportMode>,
    local: Arc<dyn InboxBackend>,
    remote: Arc<dyn InboxBackend>,
}

impl TransportSelector {
    pub fn new(
        mode: TransportMode,
        local: Arc<dyn InboxBackend>,
        remote: Arc<dyn InboxBackend>,
    ) -> Self {
        Self {
            mode: RwLock::new(mode),
            local,
            remote,
        }
    }

    pub async fn mode(&self) -> TransportMode {
        *self.mode.read().await
    }

    /// Switch transports. Safe at any time; in-flight calls finish on the
    /// adapter they started on.
    pub async fn select(&self, mode: TransportMode) {
        let mut current = self.mode.write().await;
        let previous = *current;
        if previous != mode {
            info!(from = %previous, to = %mode, "Transport switched");
            *current = mode;
        }
    }

    /// Adapter for the current mode.
    pub async fn adapter(&self) -> Arc<dyn InboxBackend> {
        match self.mode().await {
            TransportMode::Local => Arc::clone(&self.local),
            TransportMode::Remote => Arc::clone(&self.remote),
        }
    }
}
