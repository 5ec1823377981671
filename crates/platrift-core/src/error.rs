//! Setup-time errors.
//!
//! Per-turn conditions (zero-quantity creation, rejected moves, empty node
//! lookups) are not errors — they are handled locally as no-ops or `None`.
//! The only fallible surface is topology setup, where referencing a node id
//! that was never registered is a programming error in the caller.

use thiserror::Error;

use crate::graph::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An adjacency or headquarters reference named a node id that does not
    /// exist in the graph.
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),
}
