//! Observability sink for bridge failures.
//!
//! Reporting is fire-and-forget: a sink must never block the caller and
//! nothing it does feeds back into control flow.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::BridgeError;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// How a failed call was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Host unreachable or the call timed out.
    Unavailable,
    /// Host answered with an error or an undecodable result.
    Backend,
}

/// One failed bridge invocation.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeFailure {
    pub invocation_id: Uuid,
    pub command: String,
    pub kind: FailureKind,
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl BridgeFailure {
    pub fn from_error(invocation_id: Uuid, error: &BridgeError) -> Self {
        let kind = if error.is_unavailable() {
            FailureKind::Unavailable
        } else {
            FailureKind::Backend
        };
        Self {
            invocation_id,
            command: error.command().to_string(),
            kind,
            detail: error.to_string(),
            at: Utc::now(),
        }
    }
}

/// Receives bridge failure reports.
pub trait FailureSink: Send + Sync {
    fn report(&self, failure: &BridgeFailure);
}

/// Writes failures to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn report(&self, failure: &BridgeFailure) {
        tracing::warn!(
            invocation_id = %failure.invocation_id,
            command = %failure.command,
            kind = ?failure.kind,
            "Bridge invoke failed: {}",
            failure.detail
        );
    }
}

/// Logs failures and fans them out to subscribers.
pub struct BroadcastSink {
    tx: broadcast::Sender<BridgeFailure>,
}

impl BroadcastSink {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeFailure> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureSink for BroadcastSink {
    fn report(&self, failure: &BridgeFailure) {
        TracingSink.report(failure);
        // No subscribers is fine
        let _ = self.tx.send(failure.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn classifies_failures() {
        let id = Uuid::new_v4();
        let timeout = BridgeFailure::from_error(
            id,
            &BridgeError::Timeout {
                command: "get_inbox".into(),
                timeout: Duration::from_millis(10),
            },
        );
        assert_eq!(timeout.kind, FailureKind::Unavailable);
        assert_eq!(timeout.command, "get_inbox");
        assert_eq!(timeout.invocation_id, id);

        let rejected = BridgeFailure::from_error(
            id,
            &BridgeError::InvalidResponse {
                command: "commit_inbox".into(),
                reason: "missing field `committedCount`".into(),
            },
        );
        assert_eq!(rejected.kind, FailureKind::Backend);
    }

    #[tokio::test]
    async fn broadcast_sink_delivers_to_subscribers() {
        let sink = BroadcastSink::new();
        let mut rx = sink.subscribe();

        let failure = BridgeFailure::from_error(
            Uuid::new_v4(),
            &BridgeError::Unreachable {
                command: "import_csv".into(),
                reason: "connection refused".into(),
            },
        );
        sink.report(&failure);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.command, "import_csv");
        assert_eq!(received.kind, FailureKind::Unavailable);
    }

    #[test]
    fn broadcast_sink_without_subscribers_does_not_panic() {
        let sink = BroadcastSink::new();
        sink.report(&BridgeFailure::from_error(
            Uuid::new_v4(),
            &BridgeError::Backend {
                command: "get_summary".into(),
                status: Some(500),
                message: "boom".into(),
            },
        ));
    }
}
