//! One user's editing session over a single automation.
//!
//! The session owns the graph, the backend clients and the progress
//! poller, and is the only place submission happens: `save` and `test_run`
//! order the graph, assemble the automation record and hand it to the
//! Automation API. Failures leave the graph untouched so the user can
//! retry; closing the session cancels background polling.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::{AutomationApi, PlatformConnections, ProgressApi};
use crate::catalog::{BlockKind, Platform};
use crate::config::Config;
use crate::error::SessionError;
use crate::runtime::poller::ProgressPoller;
use crate::runtime::sorter;
use crate::workflow::graph::FlowGraph;
use crate::workflow::types::{AutomationRecord, Node, StartTrigger};

/// Name substituted when the user saves without typing one.
const UNTITLED_NAME: &str = "Untitled automation";

/// Editing session: graph + backend clients + progress poller.
pub struct EditorSession {
    config: Config,
    graph: FlowGraph,
    automation: Arc<dyn AutomationApi>,
    platforms: Arc<dyn PlatformConnections>,
    progress: Arc<dyn ProgressApi>,
    poller: ProgressPoller,
}

impl EditorSession {
    /// Session over a brand-new, empty automation.
    pub fn new(
        config: Config,
        automation: Arc<dyn AutomationApi>,
        platforms: Arc<dyn PlatformConnections>,
        progress: Arc<dyn ProgressApi>,
    ) -> Self {
        Self {
            config,
            graph: FlowGraph::new(),
            automation,
            platforms,
            progress,
            poller: ProgressPoller::new(),
        }
    }

    /// Session over a previously saved automation.
    pub fn open(
        config: Config,
        record: &AutomationRecord,
        automation: Arc<dyn AutomationApi>,
        platforms: Arc<dyn PlatformConnections>,
        progress: Arc<dyn ProgressApi>,
    ) -> Self {
        let graph = FlowGraph::hydrate(record);
        tracing::info!(
            "📂 Opened automation '{}' with {} step(s)",
            record.name,
            graph.len()
        );
        Self {
            config,
            graph,
            automation,
            platforms,
            progress,
            poller: ProgressPoller::new(),
        }
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut FlowGraph {
        &mut self.graph
    }

    pub fn poller(&self) -> &ProgressPoller {
        &self.poller
    }

    /// Add a step of `kind`, gating social kinds on a linked account.
    ///
    /// Non-social kinds go straight through the graph model. For social
    /// kinds the platform connection is checked first; an unconnected
    /// platform defers the insertion (the external auth flow takes over)
    /// and the graph is unchanged.
    pub async fn add_node(&mut self, kind: BlockKind) -> Result<Node, SessionError> {
        let Some(platform) = kind.platform() else {
            return Ok(self.graph.add_node(kind)?);
        };
        let connected = self
            .platforms
            .check_status(platform, &self.config.api.tenant)
            .await?;
        if !connected {
            tracing::warn!("🔌 {platform} is not connected; deferring step insertion");
            return Err(SessionError::PlatformNotConnected(platform));
        }
        Ok(self.graph.add_node(kind)?)
    }

    /// Wait for `platform` to report a linked account, polling at the
    /// configured connection cadence. Returns false if `cancel` fires
    /// first (the user dismissed the auth flow).
    pub async fn await_platform_connection(
        &self,
        platform: Platform,
        cancel: &CancellationToken,
    ) -> Result<bool, SessionError> {
        let interval = Duration::from_secs(self.config.polling.connection_interval_secs);
        loop {
            if self
                .platforms
                .check_status(platform, &self.config.api.tenant)
                .await?
            {
                tracing::info!("🔗 {platform} connected");
                return Ok(true);
            }
            tokio::select! {
                _ = cancel.cancelled() => return Ok(false),
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Persist the automation: order the graph, assemble the record and
    /// create or update depending on whether a backend id exists.
    ///
    /// Returns the automation id. On failure the graph is preserved and
    /// the error is surfaced for a retryable notification.
    pub async fn save(&mut self, name: &str, start: StartTrigger) -> Result<String, SessionError> {
        let record = self.assemble(name, start, false)?;
        let result = match self.graph.automation_id() {
            Some(id) => {
                let id = id.to_string();
                self.automation.update(&record).await.map(|()| id)
            }
            None => self.automation.create(&record).await,
        };
        match result {
            Ok(id) => {
                tracing::info!(
                    "✅ Saved automation '{}' ({} step(s)) as {id}",
                    record.name,
                    record.nodes.len()
                );
                self.graph.set_automation_id(id.clone());
                Ok(id)
            }
            Err(e) => {
                tracing::error!("❌ Failed to save automation '{}': {e}", record.name);
                Err(e.into())
            }
        }
    }

    /// Submit the same record flagged `testing: true`; the backend runs it
    /// once immediately. Only available for schedule-based starts.
    pub async fn test_run(&mut self, name: &str, start: StartTrigger) -> Result<(), SessionError> {
        if !start.is_schedule() {
            return Err(SessionError::TestRunUnavailable);
        }
        let record = self.assemble(name, start, true)?;
        match self.graph.automation_id() {
            Some(_) => self.automation.update(&record).await?,
            None => {
                self.automation.create(&record).await?;
            }
        }
        tracing::info!("🧪 Test run submitted for '{}'", record.name);
        Ok(())
    }

    /// Start the background progress poll for this session's tenant.
    pub fn start_progress_polling(&mut self) {
        let interval = Duration::from_secs(self.config.polling.progress_interval_secs);
        self.poller
            .start(Arc::clone(&self.progress), self.config.api.tenant.clone(), interval);
    }

    pub async fn stop_progress_polling(&mut self) {
        self.poller.stop().await;
    }

    /// Close the editor: unsaved edits are discarded with the graph and
    /// background polling stops deterministically.
    pub async fn close(mut self) {
        self.poller.stop().await;
        tracing::debug!("👋 Editor session closed");
    }

    fn assemble(
        &self,
        name: &str,
        start: StartTrigger,
        testing: bool,
    ) -> Result<AutomationRecord, SessionError> {
        let nodes = sorter::sort_for_submission(&self.graph, self.config.cycle_policy)?;
        let name = if name.trim().is_empty() {
            UNTITLED_NAME.to_string()
        } else {
            name.to_string()
        };
        Ok(AutomationRecord {
            id: self.graph.automation_id().map(str::to_string),
            name,
            nodes,
            edges: self.graph.edges().to_vec(),
            start,
            testing,
        })
    }
}
