//! HTTP backend host — posts each command as JSON to the backend process.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::BackendHost;
use crate::error::{BridgeError, ConfigError};

/// Backend host reachable at `{base_url}/invoke/{command}`.
pub struct HttpBackendHost {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpBackendHost {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<SecretString>,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(base_url));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, command: &str) -> String {
        format!("{}/invoke/{}", self.base_url, command)
    }
}

#[async_trait]
impl BackendHost for HttpBackendHost {
    fn name(&self) -> &str {
        "http"
    }

    async fn call(&self, command: &str, payload: Option<Value>) -> Result<Value, BridgeError> {
        let body = payload.unwrap_or_else(|| Value::Object(Default::default()));
        let mut request = self.client.post(self.endpoint(command)).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request.send().await.map_err(|e| BridgeError::Unreachable {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BridgeError::Backend {
                command: command.to_string(),
                status: Some(status.as_u16()),
                message,
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| BridgeError::InvalidResponse {
                command: command.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_command() {
        let host = HttpBackendHost::new("http://localhost:7070/", None).unwrap();
        assert_eq!(
            host.endpoint("commit_inbox"),
            "http://localhost:7070/invoke/commit_inbox"
        );
    }

    #[test]
    fn rejects_non_http_url() {
        assert!(HttpBackendHost::new("localhost:7070", None).is_err());
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let host = HttpBackendHost::new(format!("http://127.0.0.1:{port}"), None).unwrap();
        let err = host.call("get_inbox", None).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
