//! Error taxonomy for the editor core.
//!
//! Validation rejections (graph mutations), cycle errors (submission-time
//! ordering) and network failures (API clients) are kept apart so callers
//! can surface each the way the editor expects: rejected mutations become
//! notifications, cycle errors block submission, network errors are logged
//! and leave the graph intact for retry.

use uuid::Uuid;

use crate::api::ApiError;
use crate::catalog::{BlockKind, Platform};

/// Rejected graph mutation. Never fatal; the mutation is simply not applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A second trigger step was added while one already exists.
    #[error("automation already has a trigger step ({existing})")]
    DuplicateTrigger { existing: BlockKind },

    /// An operation referenced a node id that is not in the graph.
    #[error("unknown step: {0}")]
    UnknownNode(Uuid),

    /// An edge would connect a node to itself.
    #[error("a step cannot be connected to itself: {0}")]
    SelfLoop(Uuid),

    /// `update_params` supplied a params variant for a different kind.
    #[error("params kind {provided} does not match step kind {expected}")]
    ParamsKindMismatch {
        expected: BlockKind,
        provided: BlockKind,
    },
}

/// Submission-time ordering failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    /// The graph contains at least one cycle; the listed steps could not
    /// be placed in execution order.
    #[error("workflow contains a cycle; {} step(s) could not be ordered", .unsorted.len())]
    CycleDetected { unsorted: Vec<Uuid> },
}

/// Failure surfaced by an [`crate::session::EditorSession`] operation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The platform account is not linked; the step insertion is deferred
    /// until the external auth flow reports success.
    #[error("{0} account is not connected")]
    PlatformNotConnected(Platform),

    /// Test runs only apply to schedule-based automations.
    #[error("test runs are only available for scheduled automations")]
    TestRunUnavailable,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Sort(#[from] SortError),

    /// Backend call failed; the graph is preserved for retry.
    #[error(transparent)]
    Api(#[from] ApiError),
}
