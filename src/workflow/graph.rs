//! The owned node/edge aggregate one editor session mutates.
//!
//! All editing operations go through [`FlowGraph`]; there is no ambient
//! graph state. Rejections are reported as [`GraphError`] values and logged
//! as warnings, never panics — a refused mutation leaves the graph exactly
//! as it was.

use rand::Rng;
use uuid::Uuid;

use crate::catalog::{self, BlockKind};
use crate::error::GraphError;

use super::types::{AutomationRecord, Edge, Node, Position, StepParams};

/// Canvas area fresh nodes are scattered across.
const SPAWN_X: std::ops::Range<f64> = 80.0..640.0;
const SPAWN_Y: std::ops::Range<f64> = 80.0..480.0;

/// In-memory workflow graph for a single editing session.
///
/// Nodes keep insertion order; that order is the tie-break for topological
/// sorting and the basis for progress-key indices.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    /// Backend id of the automation this graph was hydrated from, if any
    automation_id: Option<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl FlowGraph {
    /// Empty graph for a brand-new automation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an editable graph from a previously saved automation.
    pub fn hydrate(record: &AutomationRecord) -> Self {
        Self {
            automation_id: record.id.clone(),
            nodes: record.nodes.clone(),
            edges: record.edges.clone(),
        }
    }

    pub fn automation_id(&self) -> Option<&str> {
        self.automation_id.as_deref()
    }

    pub(crate) fn set_automation_id(&mut self, id: String) {
        self.automation_id = Some(id);
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in connection order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The graph's trigger step, if one has been added.
    pub fn trigger(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind().is_trigger())
    }

    /// Incoming edges of `id`, in connection order.
    pub fn incoming(&self, id: Uuid) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.target == id)
    }

    /// Add a step of `kind` with catalog defaults and a scattered position.
    ///
    /// A second trigger-kind step is rejected: the existing trigger stays,
    /// the node count is unchanged, and the caller surfaces the error as a
    /// notification.
    pub fn add_node(&mut self, kind: BlockKind) -> Result<Node, GraphError> {
        if kind.is_trigger() {
            if let Some(existing) = self.trigger() {
                let existing = existing.kind();
                tracing::warn!("🚫 Rejected {kind} step: trigger {existing} already present");
                return Err(GraphError::DuplicateTrigger { existing });
            }
        }

        let spec = catalog::spec(kind);
        let node = Node {
            id: Uuid::new_v4(),
            label: spec.label.to_string(),
            position: spawn_position(),
            params: spec.default_params(),
        };
        tracing::debug!("➕ Added {kind} step {} ('{}')", node.id, node.label);
        self.nodes.push(node.clone());
        Ok(node)
    }

    /// Remove a step and every edge touching it. Returns false when the id
    /// is unknown.
    pub fn remove_node(&mut self, id: Uuid) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        tracing::debug!("🗑️ Removed step {id} and its edges");
        true
    }

    /// Connect `source → target`. Both steps must exist and differ.
    ///
    /// Connecting an already-connected pair is a no-op returning
    /// `Ok(false)`; the edge set never holds duplicates.
    pub fn connect(&mut self, source: Uuid, target: Uuid) -> Result<bool, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source));
        }
        for id in [source, target] {
            if self.node(id).is_none() {
                return Err(GraphError::UnknownNode(id));
            }
        }
        if self
            .edges
            .iter()
            .any(|e| e.source == source && e.target == target)
        {
            return Ok(false);
        }
        self.edges.push(Edge { source, target });
        Ok(true)
    }

    /// Remove the `source → target` edge. Returns false when absent.
    pub fn disconnect(&mut self, source: Uuid, target: Uuid) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.source == source && e.target == target));
        self.edges.len() < before
    }

    /// Replace a step's parameters. The new variant must match the step's
    /// kind, so a node can never change kind after creation.
    pub fn update_params(&mut self, id: Uuid, params: StepParams) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(GraphError::UnknownNode(id))?;
        let expected = node.kind();
        let provided = params.kind();
        if provided != expected {
            return Err(GraphError::ParamsKindMismatch { expected, provided });
        }
        node.params = params;
        Ok(())
    }

    /// Move a step on the canvas. Layout only.
    pub fn set_position(&mut self, id: Uuid, position: Position) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(GraphError::UnknownNode(id))?;
        node.position = position;
        Ok(())
    }
}

fn spawn_position() -> Position {
    let mut rng = rand::thread_rng();
    Position {
        x: rng.gen_range(SPAWN_X),
        y: rng.gen_range(SPAWN_Y),
    }
}
