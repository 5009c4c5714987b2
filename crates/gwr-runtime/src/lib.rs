//! # GWR Runtime
//!
//! Graph backends, the gas engine, the trainer and the collapser.
//!
//! The engine is generic over any [`GasGraph`](gwr_core::graph::GasGraph);
//! two backends ship here: a petgraph `StableGraph` (default) and a slab
//! arena. Logging goes through `tracing`; install a subscriber to see the
//! per-batch reports.

pub mod topology_impl;
pub mod array_topology;
pub mod backend;
pub mod config;
pub mod gas;
pub mod collapse;
pub mod trainer;
pub mod stats;
pub mod export;
pub mod prelude;
