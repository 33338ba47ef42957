//! Runtime layer: submission ordering, dependency lookups and progress
//! polling.
//!
//! - Topological ordering of the graph for submission (petgraph + Kahn)
//! - Backward dependency resolution for field locking and form variables
//! - Cancellable background progress polling with a lock-free snapshot

// Submission-time topological ordering
pub mod sorter;

// Backward dependency lookups (generator feeds, form variables)
pub mod resolver;

// Background progress polling service
pub mod poller;

// Re-export main types
pub use poller::{NodeVisual, ProgressPoller};
pub use sorter::CyclePolicy;
