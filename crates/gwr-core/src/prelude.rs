//! GWR Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use gwr_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{
    NodeId, EdgeId,
    NodeData, EdgeData,
    Slot,
};

// Re-export the GasGraph trait
pub use crate::graph::{GasGraph, check_invariants};

pub use crate::distance::{SquareDistances, Nearest};
pub use crate::habituation::Habituation;
pub use crate::policy::{ThresholdPolicy, ThresholdFn};

// Re-export error types
pub use crate::error::{GasError, GraphViolation, Result};
