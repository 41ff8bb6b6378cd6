//! Configuration types.
//!
//! Everything is read from `INBOX_*` environment variables. The pipeline
//! receives a fully built [`InboxConfig`]; nothing here is process-global.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bridge call timeout in milliseconds.
const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 5_000;

/// Which adapter backs the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Local,
    Remote,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(ConfigError::InvalidValue {
                key: "INBOX_TRANSPORT".to_string(),
                message: format!("expected 'local' or 'remote', got '{other}'"),
            }),
        }
    }
}

/// What an adapter does when the backend answers with an error
/// (as opposed to being unreachable).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendErrorPolicy {
    /// Serve the in-memory fallback, same as for an unavailable backend.
    #[default]
    Fallback,
    /// Return `InboxError::Backend` to the caller.
    Surface,
}

/// A monthly spending cap for one category. Read-only input to summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConfig {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cap: Decimal,
}

impl BudgetConfig {
    pub fn new(category: impl Into<String>, cap: Decimal) -> Self {
        Self {
            category: category.into(),
            cap,
        }
    }
}

/// Budgets used when `INBOX_BUDGETS` is not set.
pub fn default_budgets() -> Vec<BudgetConfig> {
    vec![
        BudgetConfig::new("Housing", dec!(1800)),
        BudgetConfig::new("Groceries", dec!(700)),
        BudgetConfig::new("Dining", dec!(350)),
        BudgetConfig::new("Transportation", dec!(250)),
        BudgetConfig::new("Discretionary", dec!(500)),
    ]
}

/// Inbox pipeline configuration.
#[derive(Debug, Clone)]
pub struct InboxConfig {
    /// Adapter selected at startup.
    pub transport: TransportMode,
    /// Base URL of the native backend host. `None` means no host is present.
    pub backend_url: Option<String>,
    /// Bearer token sent to the backend host.
    pub backend_token: Option<SecretString>,
    /// Upper bound on a single bridge call. `None` waits forever.
    pub bridge_timeout: Option<Duration>,
    /// Handling of structured backend failures.
    pub backend_errors: BackendErrorPolicy,
    /// Placeholder rows synthesized per fallback import.
    pub placeholder_rows: usize,
    /// Start the fallback batch with demo items.
    pub seed_demo_inbox: bool,
    /// Budgets consumed by summary computations.
    pub budgets: Vec<BudgetConfig>,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            transport: TransportMode::Local,
            backend_url: None,
            backend_token: None,
            bridge_timeout: Some(Duration::from_millis(DEFAULT_BRIDGE_TIMEOUT_MS)),
            backend_errors: BackendErrorPolicy::Fallback,
            placeholder_rows: 1,
            seed_demo_inbox: false,
            budgets: default_budgets(),
        }
    }
}

impl InboxConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = get("INBOX_TRANSPORT") {
            config.transport = raw.parse()?;
        }

        if let Some(url) = get("INBOX_BACKEND_URL") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url));
            }
            config.backend_url = Some(url.trim_end_matches('/').to_string());
        }

        config.backend_token = get("INBOX_BACKEND_TOKEN").map(SecretString::from);

        if let Some(raw) = get("INBOX_BRIDGE_TIMEOUT_MS") {
            let ms: u64 = parse_value("INBOX_BRIDGE_TIMEOUT_MS", &raw)?;
            config.bridge_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        if let Some(raw) = get("INBOX_SURFACE_BACKEND_ERRORS") {
            config.backend_errors = if parse_bool("INBOX_SURFACE_BACKEND_ERRORS", &raw)? {
                BackendErrorPolicy::Surface
            } else {
                BackendErrorPolicy::Fallback
            };
        }

        if let Some(raw) = get("INBOX_PLACEHOLDER_ROWS") {
            let rows: usize = parse_value("INBOX_PLACEHOLDER_ROWS", &raw)?;
            if rows == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "INBOX_PLACEHOLDER_ROWS".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            config.placeholder_rows = rows;
        }

        if let Some(raw) = get("INBOX_SEED_DEMO") {
            config.seed_demo_inbox = parse_bool("INBOX_SEED_DEMO", &raw)?;
        }

        if let Some(raw) = get("INBOX_BUDGETS") {
            config.budgets = parse_budgets(&raw)?;
        }

        Ok(config)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}': {e}"),
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{raw}'"),
        }),
    }
}

/// Parse `Housing=1800,Dining=350` into budget configs.
fn parse_budgets(raw: &str) -> Result<Vec<BudgetConfig>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (category, cap) =
                entry
                    .split_once('=')
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: "INBOX_BUDGETS".to_string(),
                        message: format!("expected Category=cap, got '{entry}'"),
                    })?;
            let cap: Decimal = parse_value("INBOX_BUDGETS", cap.trim())?;
            Ok(BudgetConfig::new(category.trim(), cap))
        })
        .collect()
}
