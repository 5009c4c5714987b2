//! # GWR Core
//!
//! Core traits and types for the Growing-When-Required neural gas.
//!
//! The gas is a sparse graph of prototype nodes that follows a stream of
//! sample vectors. This crate holds the pieces every engine and backend
//! share:
//!
//! - **Graph capability**: the [`GasGraph`](graph::GasGraph) trait every storage implements
//! - **Distance oracle**: squared distances from a query to all node weights
//! - **Habituation**: the freshness schedule that gates node insertion
//! - **Threshold policies**: fixed or point-dependent thresholds
//!
//! ## Quick Start
//!
//! ```rust
//! use gwr_core::prelude::*;
//!
//! let h = Habituation::default();
//! assert_eq!(h.freshness(0, Slot::Nearest), 1.0);
//! assert!(h.freshness(10, Slot::Nearest) < 1.0);
//! ```

pub mod types;
pub mod graph;
pub mod distance;
pub mod habituation;
pub mod policy;
pub mod error;
pub mod prelude;
