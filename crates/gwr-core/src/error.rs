//! Error types for gas operations.
//!
//! Threshold misses, slow growth and heavy collapsing are ordinary control
//! flow for the trainer and never surface here. What does surface is bad
//! input and misuse of the graph capability.

use crate::types::{EdgeId, NodeId};
use thiserror::Error;

/// Result type for gas operations.
pub type Result<T> = std::result::Result<T, GasError>;

/// Errors that can occur during gas operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GasError {
    /// The caller handed in data or configuration the engine cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The graph has no node left to match samples against.
    #[error("Graph is empty")]
    EmptyGraph,

    /// A graph operation would break the node/edge invariants.
    #[error("Graph invariant violation: {0}")]
    GraphInvariantViolation(GraphViolation),

    /// Serialization of a configuration or snapshot failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// The specific invariant a graph operation tried to break.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphViolation {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("edge {0} does not exist")]
    UnknownEdge(EdgeId),

    #[error("cannot connect node {0} to itself")]
    SelfLoop(NodeId),

    #[error("weight of node {node} has {found} components, expected {expected}")]
    DimensionMismatch {
        node: NodeId,
        expected: usize,
        found: usize,
    },
}

impl From<serde_json::Error> for GasError {
    fn from(e: serde_json::Error) -> Self {
        GasError::Serialization(e.to_string())
    }
}

impl From<GraphViolation> for GasError {
    fn from(v: GraphViolation) -> Self {
        GasError::GraphInvariantViolation(v)
    }
}

// Convenience constructors
impl GasError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        GasError::InvalidInput(msg.into())
    }

    pub fn unknown_node(id: NodeId) -> Self {
        GasError::GraphInvariantViolation(GraphViolation::UnknownNode(id))
    }

    pub fn unknown_edge(id: EdgeId) -> Self {
        GasError::GraphInvariantViolation(GraphViolation::UnknownEdge(id))
    }

    pub fn self_loop(id: NodeId) -> Self {
        GasError::GraphInvariantViolation(GraphViolation::SelfLoop(id))
    }

    pub fn invalid_config(field: &str, value: impl std::fmt::Display, reason: &str) -> Self {
        GasError::InvalidInput(format!("{} = {} ({})", field, value, reason))
    }

    /// Whether this error reports a broken graph invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, GasError::GraphInvariantViolation(_))
    }
}
