//! Topological ordering of the workflow graph for submission.
//!
//! The graph is compiled into a petgraph DAG and ordered with Kahn's
//! algorithm. Among ready candidates the lowest insertion index wins, so
//! the result is deterministic, stable under re-sort, and identical to
//! insertion order for graphs that are already sorted.
//!
//! Ordering only happens at submission time (save / test run), never while
//! the user is editing.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SortError;
use crate::workflow::graph::FlowGraph;
use crate::workflow::types::Node;

/// What to do when the graph contains a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Refuse to order the graph; the cycle surfaces before submission.
    #[default]
    Reject,
    /// Legacy soft-failure: log a warning and keep insertion order. The
    /// automation still submits, but its execution order is undefined.
    KeepInsertionOrder,
}

/// Order nodes so every edge's source precedes its target.
///
/// Returns the nodes in execution order, or — for cyclic graphs — either
/// [`SortError::CycleDetected`] or the unmodified insertion order,
/// depending on `policy`.
pub fn sort_for_submission(
    graph: &FlowGraph,
    policy: CyclePolicy,
) -> Result<Vec<Node>, SortError> {
    let dag = build_dag(graph);
    let node_count = dag.node_count();

    let mut in_degree: Vec<usize> = dag
        .node_indices()
        .map(|ix| dag.neighbors_directed(ix, Direction::Incoming).count())
        .collect();

    // Min-heap on insertion index: ties resolve to the earliest-added node.
    let mut ready: BinaryHeap<Reverse<NodeIndex>> = dag
        .node_indices()
        .filter(|ix| in_degree[ix.index()] == 0)
        .map(Reverse)
        .collect();

    let mut order: Vec<NodeIndex> = Vec::with_capacity(node_count);
    let mut placed = vec![false; node_count];

    while let Some(Reverse(ix)) = ready.pop() {
        order.push(ix);
        placed[ix.index()] = true;
        for child in dag.neighbors_directed(ix, Direction::Outgoing) {
            let degree = &mut in_degree[child.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse(child));
            }
        }
    }

    if order.len() < node_count {
        let unsorted: Vec<Uuid> = dag
            .node_indices()
            .filter(|ix| !placed[ix.index()])
            .map(|ix| dag[ix])
            .collect();
        return match policy {
            CyclePolicy::Reject => {
                tracing::warn!(
                    "🔄 Cycle detected; {} step(s) unplaceable, rejecting submission order",
                    unsorted.len()
                );
                Err(SortError::CycleDetected { unsorted })
            }
            CyclePolicy::KeepInsertionOrder => {
                tracing::warn!(
                    "🔄 Cycle detected; falling back to insertion order for {} step(s)",
                    node_count
                );
                Ok(graph.nodes().to_vec())
            }
        };
    }

    tracing::debug!("📋 Execution order computed for {} step(s)", node_count);
    Ok(order
        .into_iter()
        .filter_map(|ix| graph.node(dag[ix]).cloned())
        .collect())
}

/// Compile the editing graph into a petgraph DAG, keeping the id ↔ index
/// maps aligned with node insertion order.
fn build_dag(graph: &FlowGraph) -> DiGraph<Uuid, ()> {
    let mut dag = DiGraph::with_capacity(graph.len(), graph.edges().len());
    let mut index_of: HashMap<Uuid, NodeIndex> = HashMap::with_capacity(graph.len());

    for node in graph.nodes() {
        let ix = dag.add_node(node.id);
        index_of.insert(node.id, ix);
    }
    for edge in graph.edges() {
        // FlowGraph guarantees edge endpoints exist
        if let (Some(&s), Some(&t)) = (index_of.get(&edge.source), index_of.get(&edge.target)) {
            dag.add_edge(s, t, ());
        }
    }
    dag
}
