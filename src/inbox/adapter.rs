//! Backend adapters — translate pipeline operations into bridge calls with
//! an in-memory fallback.
//!
//! Both adapters own an independent [`MemoryInbox`] behind a mutex that is
//! held for the whole operation, bridge call included, so mutating calls on
//! one adapter never interleave.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::memory::MemoryInbox;
use super::model::{CommitResult, ImportFile, InboxItem, SetCategoryAck};
use crate::bridge::{Outcome, TransportBridge, commands};
use crate::config::{BackendErrorPolicy, BudgetConfig, InboxConfig, TransportMode};
use crate::error::InboxError;
use crate::ledger::{NetWorthPoint, SummaryResponse};

/// Operations every transport must provide.
#[async_trait]
pub trait InboxBackend: Send + Sync {
    /// Which transport this adapter implements.
    fn mode(&self) -> TransportMode;

    /// Current batch in insertion order.
    async fn get_inbox(&self) -> Result<Vec<InboxItem>, InboxError>;

    /// Stage the rows of `file`, appending to the batch. Returns the batch.
    async fn import_batch(&self, file: ImportFile) -> Result<Vec<InboxItem>, InboxError>;

    /// Set one item's category. Unknown ids are ignored.
    async fn set_category(&self, temp_id: &str, category: &str)
    -> Result<SetCategoryAck, InboxError>;

    /// Promote the whole batch into the ledger and clear it.
    async fn commit_batch(&self) -> Result<CommitResult, InboxError>;

    /// Spending summary for `month` (`YYYY-MM`).
    async fn get_summary(&self, month: &str) -> Result<SummaryResponse, InboxError>;

    /// Twelve-month net-worth curve.
    async fn get_networth_curve(&self) -> Result<Vec<NetWorthPoint>, InboxError>;
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn new_store(config: &InboxConfig) -> MemoryInbox {
    if config.seed_demo_inbox {
        MemoryInbox::with_demo_items(config.placeholder_rows)
    } else {
        MemoryInbox::new(config.placeholder_rows)
    }
}

// ── Local ───────────────────────────────────────────────────────────

/// Calls the backend through the bridge and falls back to memory when the
/// backend is unavailable.
pub struct LocalAdapter {
    bridge: TransportBridge,
    store: Mutex<MemoryInbox>,
    policy: BackendErrorPolicy,
    budgets: Vec<BudgetConfig>,
}

impl LocalAdapter {
    pub fn new(bridge: TransportBridge, config: &InboxConfig) -> Self {
        Self {
            bridge,
            store: Mutex::new(new_store(config)),
            policy: config.backend_errors,
            budgets: config.budgets.clone(),
        }
    }

    /// `Some(value)` when the backend answered, `None` to take the
    /// fallback path, `Err` when a backend error must be surfaced.
    fn resolve<T>(&self, command: &str, outcome: Outcome<T>) -> Result<Option<T>, InboxError> {
        match outcome {
            Outcome::Ok(value) => Ok(Some(value)),
            Outcome::Unavailable => {
                debug!(command, "Backend unavailable, using in-memory inbox");
                Ok(None)
            }
            Outcome::BackendError(detail) => match self.policy {
                BackendErrorPolicy::Fallback => {
                    debug!(command, %detail, "Backend error, using in-memory inbox");
                    Ok(None)
                }
                BackendErrorPolicy::Surface => Err(InboxError::Backend {
                    command: command.to_string(),
                    detail,
                }),
            },
        }
    }
}

#[async_trait]
impl InboxBackend for LocalAdapter {
    fn mode(&self) -> TransportMode {
        TransportMode::Local
    }

    async fn get_inbox(&self) -> Result<Vec<InboxItem>, InboxError> {
        let mut store = self.store.lock().await;
        let outcome = self
            .bridge
            .invoke_as::<Vec<InboxItem>>(commands::GET_INBOX, None)
            .await;
        match self.resolve(commands::GET_INBOX, outcome)? {
            Some(items) => {
                store.mirror(&items);
                Ok(items)
            }
            None => Ok(store.items()),
        }
    }

    async fn import_batch(&self, file: ImportFile) -> Result<Vec<InboxItem>, InboxError> {
        let mut store = self.store.lock().await;
        let outcome = self
            .bridge
            .invoke_as::<Vec<InboxItem>>(commands::IMPORT_CSV, Some(file.to_payload()))
            .await;
        let items = match self.resolve(commands::IMPORT_CSV, outcome)? {
            Some(items) => {
                store.mirror(&items);
                items
            }
            None => store.append_placeholders(&file.name, today()),
        };
        info!(
            file = %file.name,
            bytes = file.bytes.len(),
            total = items.len(),
            "Statement imported"
        );
        Ok(items)
    }

    async fn set_category(
        &self,
        temp_id: &str,
        category: &str,
    ) -> Result<SetCategoryAck, InboxError> {
        let mut store = self.store.lock().await;
        let payload = json!({ "tempId": temp_id, "category": category });
        let outcome = self
            .bridge
            .invoke_as::<SetCategoryAck>(commands::SET_INBOX_CATEGORY, Some(payload))
            .await;
        match self.resolve(commands::SET_INBOX_CATEGORY, outcome)? {
            Some(ack) => {
                if ack.ok {
                    store.set_category(temp_id, category);
                }
                Ok(ack)
            }
            None => {
                store.set_category(temp_id, category);
                Ok(SetCategoryAck { ok: true })
            }
        }
    }

    async fn commit_batch(&self) -> Result<CommitResult, InboxError> {
        let mut store = self.store.lock().await;
        let outcome = self
            .bridge
            .invoke_as::<CommitResult>(commands::COMMIT_INBOX, None)
            .await;
        let result = match self.resolve(commands::COMMIT_INBOX, outcome)? {
            Some(result) => {
                store.clear();
                result
            }
            None => store.commit(),
        };
        info!(count = result.committed_count, "Inbox committed");
        Ok(result)
    }

    async fn get_summary(&self, month: &str) -> Result<SummaryResponse, InboxError> {
        let store = self.store.lock().await;
        let outcome = self
            .bridge
            .invoke_as::<SummaryResponse>(commands::GET_SUMMARY, Some(json!({ "month": month })))
            .await;
        Ok(self
            .resolve(commands::GET_SUMMARY, outcome)?
            .unwrap_or_else(|| store.summary(&self.budgets, month)))
    }

    async fn get_networth_curve(&self) -> Result<Vec<NetWorthPoint>, InboxError> {
        let store = self.store.lock().await;
        let outcome = self
            .bridge
            .invoke_as::<Vec<NetWorthPoint>>(commands::GET_NETWORTH_CURVE, None)
            .await;
        Ok(self
            .resolve(commands::GET_NETWORTH_CURVE, outcome)?
            .unwrap_or_else(|| store.networth_curve(today())))
    }
}

// ── Remote ──────────────────────────────────────────────────────────

/// Placeholder for a networked transport. Serves every operation from its
/// own in-memory store.
pub struct RemoteAdapter {
    store: Mutex<MemoryInbox>,
    budgets: Vec<BudgetConfig>,
}

impl RemoteAdapter {
    pub fn new(config: &InboxConfig) -> Self {
        Self {
            store: Mutex::new(new_store(config)),
            budgets: config.budgets.clone(),
        }
    }

    fn not_implemented(operation: &str) {
        warn!(operation, "Remote transport not implemented, serving in-memory data");
    }
}

#[async_trait]
impl InboxBackend for RemoteAdapter {
    fn mode(&self) -> TransportMode {
        TransportMode::Remote
    }

    async fn get_inbox(&self) -> Result<Vec<InboxItem>, InboxError> {
        Self::not_implemented("get_inbox");
        Ok(self.store.lock().await.items())
    }

    async fn import_batch(&self, file: ImportFile) -> Result<Vec<InboxItem>, InboxError> {
        Self::not_implemented("import_batch");
        Ok(self.store.lock().await.append_placeholders(&file.name, today()))
    }

    async fn set_category(
        &self,
        temp_id: &str,
        category: &str,
    ) -> Result<SetCategoryAck, InboxError> {
        Self::not_implemented("set_category");
        self.store.lock().await.set_category(temp_id, category);
        Ok(SetCategoryAck { ok: true })
    }

    async fn commit_batch(&self) -> Result<CommitResult, InboxError> {
        Self::not_implemented("commit_batch");
        Ok(self.store.lock().await.commit())
    }

    async fn get_summary(&self, month: &str) -> Result<SummaryResponse, InboxError> {
        Self::not_implemented("get_summary");
        Ok(self.store.lock().await.summary(&self.budgets, month))
    }

    async fn get_networth_curve(&self) -> Result<Vec<NetWorthPoint>, InboxError> {
        Self::not_implemented("get_networth_curve");
        Ok(self.store.lock().await.networth_curve(today()))
    }
}

/// Build both adapters for `config` around `bridge`.
pub fn build_adapters(
    config: &InboxConfig,
    bridge: TransportBridge,
) -> (Arc<dyn InboxBackend>, Arc<dyn InboxBackend>) {
    (
        Arc::new(LocalAdapter::new(bridge, config)),
        Arc::new(RemoteAdapter::new(config)),
    )
}
