//! GWR Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use gwr_runtime::prelude::*;
//! ```

// Re-export the engine
pub use crate::gas::{Gas, BatchCounts, StepKind};

// Re-export configuration
pub use crate::config::{GasConfig, TrainingConfig, ErrorTolerance, StoppingCriterion};

// Re-export training
pub use crate::trainer::{Trainer, TrainingOutcome, BatchReport, StopReason};

// Re-export collapsing
pub use crate::collapse::{collapse, merge_nodes, CollapseReport};

// Re-export export
pub use crate::export::{snapshot, graph_stats, GraphSnapshot, GraphStats, NodeSnapshot, EdgeSnapshot};

// Re-export backend configuration
pub use crate::backend::{BackendConfig, DynGasGraph, create_backend};
pub use crate::topology_impl::PetGasGraph;
pub use crate::array_topology::ArrayGasGraph;

// Re-export from core
pub use gwr_core::prelude::*;
