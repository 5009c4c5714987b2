//! Graph backend configuration and factory.
//!
//! Provides a unified interface for selecting a graph storage backend.

use crate::array_topology::ArrayGasGraph;
use crate::topology_impl::PetGasGraph;
use gwr_core::graph::GasGraph;
use serde::{Deserialize, Serialize};

/// Configuration for graph backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendConfig {
    /// petgraph `StableGraph` (default).
    #[default]
    Petgraph,

    /// Slab arena with per-node ordered adjacency.
    Array {
        /// Number of node slots to reserve up front.
        capacity: usize,
    },
}

impl BackendConfig {
    pub fn petgraph() -> Self {
        BackendConfig::Petgraph
    }

    pub fn array() -> Self {
        BackendConfig::Array { capacity: 0 }
    }

    /// Reserve room for `capacity` nodes in the array backend.
    pub fn with_capacity(mut self, size: usize) -> Self {
        if let BackendConfig::Array { capacity } = &mut self {
            *capacity = size;
        }
        self
    }
}

/// Trait object for graph backends.
///
/// This allows storing different backend implementations behind a single type.
pub type DynGasGraph = Box<dyn GasGraph + Send + Sync>;

/// Create an empty graph backend from configuration.
pub fn create_backend(config: &BackendConfig) -> DynGasGraph {
    match config {
        BackendConfig::Petgraph => Box::new(PetGasGraph::new()),
        // edges in a gas run at a small multiple of nodes
        BackendConfig::Array { capacity } => {
            Box::new(ArrayGasGraph::with_capacity(*capacity, capacity * 3))
        }
    }
}
