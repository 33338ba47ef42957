//! HTTP clients for the remote automation backend.
//!
//! The editor core owns no persistence or execution; everything flows
//! through these boundary contracts. Each contract is a trait so tests and
//! alternative transports can stand in for the reqwest implementations.

// Automation API: create and update submitted automations
pub mod automation;

// Platform-connection-status API, one endpoint per social platform
pub mod platforms;

// Progress API: read-only execution status per automation step
pub mod progress;

pub use automation::{AutomationApi, HttpAutomationApi};
pub use platforms::{HttpPlatformConnections, PlatformConnections};
pub use progress::{HttpProgressApi, ProgressApi, StepStatus};

/// Backend call failure. Callers log it, surface a notification, and keep
/// editor state intact for retry.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("backend rejected the request with status {status}")]
    Status { status: reqwest::StatusCode },

    #[error("invalid record: {0}")]
    InvalidRecord(&'static str),
}

/// Map non-2xx responses to [`ApiError::Status`].
pub(crate) fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status { status })
    }
}
