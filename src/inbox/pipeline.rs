//! Inbox pipeline — the staging/commit state machine exposed to callers.
//!
//! Every operation is forwarded to the adapter currently selected and
//! awaited to completion, so a read issued after `import_batch` returns
//! always observes the appended rows. The pipeline keeps no copy of the
//! batch between calls.

use std::sync::Arc;

use tracing::debug;

use super::adapter::{InboxBackend, build_adapters};
use super::model::{CommitResult, ImportFile, InboxItem, SetCategoryAck};
use super::selector::TransportSelector;
use crate::bridge::{FailureSink, TracingSink, TransportBridge};
use crate::config::{InboxConfig, TransportMode};
use crate::error::{ConfigError, InboxError};
use crate::ledger::{NetWorthPoint, SummaryResponse};

pub struct InboxPipeline {
    selector: Arc<TransportSelector>,
}

impl InboxPipeline {
    pub fn new(selector: Arc<TransportSelector>) -> Self {
        Self { selector }
    }

    /// Build a pipeline from `config`, logging bridge failures via tracing.
    pub fn from_config(config: &InboxConfig) -> Result<Self, ConfigError> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Build a pipeline from `config`, reporting bridge failures to `sink`.
    pub fn with_sink(
        config: &InboxConfig,
        sink: Arc<dyn FailureSink>,
    ) -> Result<Self, ConfigError> {
        let bridge = TransportBridge::from_config(config, sink)?;
        Ok(Self::with_bridge(config, bridge))
    }

    /// Build a pipeline around an already constructed bridge.
    pub fn with_bridge(config: &InboxConfig, bridge: TransportBridge) -> Self {
        let (local, remote) = build_adapters(config, bridge);
        Self::new(Arc::new(TransportSelector::new(config.transport, local, remote)))
    }

    /// A pipeline with no backend host; everything runs in memory.
    pub fn disconnected(config: &InboxConfig) -> Self {
        Self::with_bridge(config, TransportBridge::detached())
    }

    pub async fn transport_mode(&self) -> TransportMode {
        self.selector.mode().await
    }

    pub async fn switch_transport(&self, mode: TransportMode) {
        self.selector.select(mode).await;
    }

    async fn adapter(&self) -> Arc<dyn InboxBackend> {
        self.selector.adapter().await
    }

    pub async fn get_inbox(&self) -> Result<Vec<InboxItem>, InboxError> {
        self.adapter().await.get_inbox().await
    }

    pub async fn import_batch(&self, file: ImportFile) -> Result<Vec<InboxItem>, InboxError> {
        debug!(file = %file.name, "Importing statement");
        self.adapter().await.import_batch(file).await
    }

    pub async fn set_category(
        &self,
        temp_id: &str,
        category: &str,
    ) -> Result<SetCategoryAck, InboxError> {
        self.adapter().await.set_category(temp_id, category).await
    }

    /// Commit the staged batch. An empty batch commits zero items.
    pub async fn commit_batch(&self) -> Result<CommitResult, InboxError> {
        self.adapter().await.commit_batch().await
    }

    pub async fn get_summary(&self, month: &str) -> Result<SummaryResponse, InboxError> {
        self.adapter().await.get_summary(month).await
    }

    pub async fn get_networth_curve(&self) -> Result<Vec<NetWorthPoint>, InboxError> {
        self.adapter().await.get_networth_curve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> InboxPipeline {
        InboxPipeline::disconnected(&InboxConfig::default())
    }

    #[tokio::test]
    async fn import_is_visible_to_next_read() {
        let pipeline = pipeline();
        let returned = pipeline
            .import_batch(ImportFile::new("jan.csv", Vec::new()))
            .await
            .unwrap();
        assert_eq!(pipeline.get_inbox().await.unwrap(), returned);
    }

    #[tokio::test]
    async fn empty_commit_is_zero() {
        let pipeline = pipeline();
        assert_eq!(pipeline.commit_batch().await.unwrap().committed_count, 0);
        assert!(pipeline.get_inbox().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn starts_in_configured_mode() {
        let config = InboxConfig {
            transport: TransportMode::Remote,
            ..InboxConfig::default()
        };
        let pipeline = InboxPipeline::disconnected(&config);
        assert_eq!(pipeline.transport_mode().await, TransportMode::Remote);

        pipeline.switch_transport(TransportMode::Local).await;
        assert_eq!(pipeline.transport_mode().await, TransportMode::Local);
    }

    #[tokio::test]
    async fn pipelines_do_not_share_state() {
        let first = pipeline();
        let second = pipeline();
        first
            .import_batch(ImportFile::new("jan.csv", Vec::new()))
            .await
            .unwrap();
        assert!(second.get_inbox().await.unwrap().is_empty());
    }
}
