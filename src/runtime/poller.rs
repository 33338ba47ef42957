//! Background progress polling with an atomically swapped status snapshot.
//!
//! One cancellable tokio task polls the Progress API on a fixed interval
//! and swaps each result into a lock-free snapshot; readers map the
//! snapshot onto per-node visual states without ever blocking the poll
//! loop. Starting a poller that is already running replaces the previous
//! task, so remounting the workflow view can never accumulate timers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::{ProgressApi, StepStatus};
use crate::workflow::graph::FlowGraph;

/// Visual overlay state for one node. Purely presentational; never feeds
/// back into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeVisual {
    /// No status reported yet
    #[default]
    Idle,
    Loading,
    Done,
    Error,
}

impl From<StepStatus> for NodeVisual {
    fn from(status: StepStatus) -> Self {
        match status {
            StepStatus::Loading => NodeVisual::Loading,
            StepStatus::Done => NodeVisual::Done,
            StepStatus::Error => NodeVisual::Error,
        }
    }
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodic Progress API reader with a lock-free status snapshot.
pub struct ProgressPoller {
    snapshot: Arc<ArcSwap<HashMap<String, StepStatus>>>,
    task: Option<PollTask>,
}

impl ProgressPoller {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(HashMap::new())),
            task: None,
        }
    }

    /// Start polling `api` every `interval`. A previous loop, if any, is
    /// cancelled first: at most one active poll task per poller.
    pub fn start(&mut self, api: Arc<dyn ProgressApi>, tenant: impl Into<String>, interval: Duration) {
        self.cancel_task();

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let snapshot = Arc::clone(&self.snapshot);
        let tenant = tenant.into();

        tracing::debug!("⏰ Starting progress polling every {interval:?}");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => {
                        tracing::debug!("⏹️ Progress polling cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        match api.get_progress(&tenant).await {
                            Ok(statuses) => {
                                tracing::debug!(
                                    "📊 Progress snapshot updated: {} tracked step(s)",
                                    statuses.len()
                                );
                                snapshot.store(Arc::new(statuses));
                            }
                            Err(e) => {
                                // skipped; the next tick retries
                                tracing::warn!("⚠️ Progress poll failed: {e}");
                            }
                        }
                    }
                }
            }
        });

        self.task = Some(PollTask { cancel, handle });
    }

    /// Stop polling and wait for the loop to wind down.
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
            let _ = task.handle.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    /// Latest backend status for a progress key, if reported.
    pub fn status_for(&self, key: &str) -> Option<StepStatus> {
        self.snapshot.load().get(key).copied()
    }

    /// Visual overlay state for a node under the latest snapshot.
    pub fn visual_for(&self, graph: &FlowGraph, id: Uuid) -> NodeVisual {
        progress_key(graph, id)
            .and_then(|key| self.status_for(&key))
            .map(NodeVisual::from)
            .unwrap_or_default()
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
            task.handle.abort();
        }
    }
}

impl Default for ProgressPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressPoller {
    // dropping the editor must not leak the poll loop
    fn drop(&mut self) {
        self.cancel_task();
    }
}

/// Backend progress key for a node: `"{blockType}[{index}]"`, where index
/// is the node's occurrence among same-kind nodes in insertion order.
pub fn progress_key(graph: &FlowGraph, id: Uuid) -> Option<String> {
    let node = graph.node(id)?;
    let kind = node.kind();
    let index = graph
        .nodes()
        .iter()
        .filter(|n| n.kind() == kind)
        .position(|n| n.id == id)?;
    Some(format!("{}[{index}]", kind.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BlockKind;

    #[test]
    fn progress_keys_index_per_kind_in_insertion_order() {
        let mut graph = FlowGraph::new();
        let first_email = graph.add_node(BlockKind::Email).unwrap();
        let tweet = graph.add_node(BlockKind::Twitter).unwrap();
        let second_email = graph.add_node(BlockKind::Email).unwrap();

        assert_eq!(
            progress_key(&graph, first_email.id).as_deref(),
            Some("email[0]")
        );
        assert_eq!(progress_key(&graph, tweet.id).as_deref(), Some("twitter[0]"));
        assert_eq!(
            progress_key(&graph, second_email.id).as_deref(),
            Some("email[1]")
        );
        assert_eq!(progress_key(&graph, Uuid::new_v4()), None);
    }

    #[test]
    fn visuals_default_to_idle_without_snapshot_entries() {
        let mut graph = FlowGraph::new();
        let email = graph.add_node(BlockKind::Email).unwrap();
        let poller = ProgressPoller::new();
        assert_eq!(poller.visual_for(&graph, email.id), NodeVisual::Idle);
    }

    #[test]
    fn statuses_map_onto_visuals() {
        assert_eq!(NodeVisual::from(StepStatus::Loading), NodeVisual::Loading);
        assert_eq!(NodeVisual::from(StepStatus::Done), NodeVisual::Done);
        assert_eq!(NodeVisual::from(StepStatus::Error), NodeVisual::Error);
    }
}
