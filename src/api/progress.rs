//! Progress API client: read-only execution status per automation step.
//!
//! Polled, never pushed. Keys look like `"email[0]"` — see
//! [`crate::runtime::poller::progress_key`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ensure_success, ApiError};

/// Backend-reported status of one automation step. Absence of a key means
/// the step has not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Loading,
    Done,
    Error,
}

/// Boundary contract for execution-progress reads.
#[async_trait]
pub trait ProgressApi: Send + Sync {
    async fn get_progress(&self, tenant: &str) -> Result<HashMap<String, StepStatus>, ApiError>;
}

/// reqwest-backed Progress API client.
#[derive(Debug, Clone)]
pub struct HttpProgressApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProgressApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ProgressApi for HttpProgressApi {
    async fn get_progress(&self, tenant: &str) -> Result<HashMap<String, StepStatus>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/progress/{tenant}", self.base_url))
            .send()
            .await?;
        let statuses = ensure_success(response)?.json().await?;
        Ok(statuses)
    }
}
