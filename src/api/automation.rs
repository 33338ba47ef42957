//! Automation API client: create and update submitted automations.
//!
//! The caller submits nodes already in execution order; the backend does
//! not re-sort them.

use async_trait::async_trait;
use serde::Deserialize;

use crate::workflow::types::AutomationRecord;

use super::{ensure_success, ApiError};

/// Boundary contract for persisting automations.
#[async_trait]
pub trait AutomationApi: Send + Sync {
    /// Create a new automation; returns the backend-assigned id.
    async fn create(&self, record: &AutomationRecord) -> Result<String, ApiError>;

    /// Update an existing automation in place. `record.id` must be set.
    async fn update(&self, record: &AutomationRecord) -> Result<(), ApiError>;
}

/// reqwest-backed Automation API client.
#[derive(Debug, Clone)]
pub struct HttpAutomationApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

impl HttpAutomationApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AutomationApi for HttpAutomationApi {
    async fn create(&self, record: &AutomationRecord) -> Result<String, ApiError> {
        tracing::debug!(
            "📤 Creating automation '{}' with {} step(s)",
            record.name,
            record.nodes.len()
        );
        let response = self
            .client
            .post(format!("{}/api/automations", self.base_url))
            .json(record)
            .send()
            .await?;
        let created: CreatedResponse = ensure_success(response)?.json().await?;
        Ok(created.id)
    }

    async fn update(&self, record: &AutomationRecord) -> Result<(), ApiError> {
        let id = record
            .id
            .as_deref()
            .ok_or(ApiError::InvalidRecord("update requires an automation id"))?;
        tracing::debug!(
            "📤 Updating automation {id} ('{}') with {} step(s)",
            record.name,
            record.nodes.len()
        );
        let response = self
            .client
            .put(format!("{}/api/automations/{id}", self.base_url))
            .json(record)
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }
}
