//! Transport bridge — the single call surface to the external backend.
//!
//! `TransportBridge::invoke()` dispatches a named command with an optional
//! JSON payload to the native backend host and never fails: a missing host,
//! a timeout, or an unreachable host all yield [`Outcome::Unavailable`],
//! while a host that answers with an error yields [`Outcome::BackendError`].
//! Every failed call is reported to the configured [`FailureSink`].
//!
//! One attempt per call, no retries.

pub mod http;
pub mod sink;

pub use http::HttpBackendHost;
pub use sink::{BridgeFailure, BroadcastSink, FailureKind, FailureSink, TracingSink};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::config::InboxConfig;
use crate::error::{BridgeError, ConfigError};

/// Command names understood by the backend host.
pub mod commands {
    pub const GET_SUMMARY: &str = "get_summary";
    pub const GET_NETWORTH_CURVE: &str = "get_networth_curve";
    pub const GET_INBOX: &str = "get_inbox";
    pub const IMPORT_CSV: &str = "import_csv";
    pub const SET_INBOX_CATEGORY: &str = "set_inbox_category";
    pub const COMMIT_INBOX: &str = "commit_inbox";
}

/// Result of a single bridge call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    /// No host, host unreachable, or call timed out.
    Unavailable,
    /// Host answered with a failure; carries the detail.
    BackendError(String),
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Collapse to `Some(value)` on success, `None` otherwise.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }
}

/// A native backend host the bridge can call into.
#[async_trait]
pub trait BackendHost: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Execute one command and return its JSON result.
    async fn call(&self, command: &str, payload: Option<Value>) -> Result<Value, BridgeError>;
}

/// Bridge between inbox adapters and the backend host.
pub struct TransportBridge {
    host: Option<Arc<dyn BackendHost>>,
    timeout: Option<Duration>,
    sink: Arc<dyn FailureSink>,
}

impl TransportBridge {
    pub fn new(
        host: Option<Arc<dyn BackendHost>>,
        timeout: Option<Duration>,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        Self {
            host,
            timeout,
            sink,
        }
    }

    /// A bridge with no host attached; every call is unavailable.
    pub fn detached() -> Self {
        Self::new(None, None, Arc::new(TracingSink))
    }

    /// Build the bridge described by `config`, attaching an HTTP host
    /// when a backend URL is configured.
    pub fn from_config(
        config: &InboxConfig,
        sink: Arc<dyn FailureSink>,
    ) -> Result<Self, ConfigError> {
        let host = match &config.backend_url {
            Some(url) => {
                let host = HttpBackendHost::new(url.clone(), config.backend_token.clone())?;
                Some(Arc::new(host) as Arc<dyn BackendHost>)
            }
            None => None,
        };
        Ok(Self::new(host, config.bridge_timeout, sink))
    }

    /// Whether a backend host is attached.
    pub fn is_connected(&self) -> bool {
        self.host.is_some()
    }

    /// Invoke `command` and return the raw JSON result.
    pub async fn invoke(&self, command: &str, payload: Option<Value>) -> Outcome<Value> {
        let Some(host) = &self.host else {
            tracing::debug!(command, "No backend host attached");
            return Outcome::Unavailable;
        };

        let invocation_id = Uuid::new_v4();
        tracing::debug!(%invocation_id, command, host = host.name(), "Bridge invoke");

        let call = host.call(command, payload);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(BridgeError::Timeout {
                    command: command.to_string(),
                    timeout: limit,
                }),
            },
            None => call.await,
        };

        match result {
            Ok(value) => Outcome::Ok(value),
            Err(error) => self.fail(invocation_id, error),
        }
    }

    /// Invoke `command` and decode the result as `T`. A result that does
    /// not decode is a backend error.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        command: &str,
        payload: Option<Value>,
    ) -> Outcome<T> {
        match self.invoke(command, payload).await {
            Outcome::Ok(value) => match serde_json::from_value(value) {
                Ok(decoded) => Outcome::Ok(decoded),
                Err(e) => self.fail(
                    Uuid::new_v4(),
                    BridgeError::InvalidResponse {
                        command: command.to_string(),
                        reason: e.to_string(),
                    },
                ),
            },
            Outcome::Unavailable => Outcome::Unavailable,
            Outcome::BackendError(detail) => Outcome::BackendError(detail),
        }
    }

    fn fail<T>(&self, invocation_id: Uuid, error: BridgeError) -> Outcome<T> {
        self.sink
            .report(&BridgeFailure::from_error(invocation_id, &error));
        if error.is_unavailable() {
            Outcome::Unavailable
        } else {
            Outcome::BackendError(error.to_string())
        }
    }
}
