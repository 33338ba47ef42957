//! Configuration for the editor core.
//!
//! Covers the backend endpoint, polling cadences and the cycle policy
//! applied at submission time.

use serde::{Deserialize, Serialize};

use crate::runtime::sorter::CyclePolicy;

/// Main editor-core configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API endpoint and tenant
    pub api: ApiConfig,
    /// Background polling cadences
    pub polling: PollingConfig,
    /// What to do with cyclic graphs at submission time
    pub cycle_policy: CyclePolicy,
}

/// Remote backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the automation backend (e.g. "https://api.example.com")
    pub base_url: String,
    /// Tenant identifier sent with progress and connection-status reads
    pub tenant: String,
}

/// Polling cadences, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Execution-progress polling interval while the editor is open
    pub progress_interval_secs: u64,
    /// Connection-status polling interval while waiting for a platform
    /// auth flow to complete
    pub connection_interval_secs: u64,
}

impl Default for Config {
    /// Defaults with ENV_VAR overrides for container deployment.
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: std::env::var("CAMPAIGNFLOW_API_URL")
                    .unwrap_or_else(|_| "http://localhost:3004".to_string()),
                tenant: std::env::var("CAMPAIGNFLOW_TENANT")
                    .unwrap_or_else(|_| "default".to_string()),
            },
            polling: PollingConfig {
                progress_interval_secs: std::env::var("CAMPAIGNFLOW_PROGRESS_POLL_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
                connection_interval_secs: std::env::var("CAMPAIGNFLOW_CONNECTION_POLL_SECS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap_or(3),
            },
            cycle_policy: CyclePolicy::Reject,
        }
    }
}
