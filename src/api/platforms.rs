//! Platform-connection-status API client.
//!
//! Consulted before a social-post step may be added to the graph; an
//! unconnected platform defers the insertion until the external auth flow
//! reports success.

use async_trait::async_trait;
use serde::Deserialize;

use crate::catalog::Platform;

use super::{ensure_success, ApiError};

/// Boundary contract for social-account connection checks.
#[async_trait]
pub trait PlatformConnections: Send + Sync {
    /// Whether the tenant has a linked account for `platform`.
    async fn check_status(&self, platform: Platform, tenant: &str) -> Result<bool, ApiError>;
}

/// reqwest-backed connection-status client.
#[derive(Debug, Clone)]
pub struct HttpPlatformConnections {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ConnectionStatus {
    connected: bool,
}

impl HttpPlatformConnections {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PlatformConnections for HttpPlatformConnections {
    async fn check_status(&self, platform: Platform, tenant: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(format!(
                "{}/api/connections/{platform}/status/{tenant}",
                self.base_url
            ))
            .send()
            .await?;
        let status: ConnectionStatus = ensure_success(response)?.json().await?;
        tracing::debug!("🔌 {platform} connection status: {}", status.connected);
        Ok(status.connected)
    }
}
