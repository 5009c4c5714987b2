//! # GWR
//!
//! Growing-When-Required neural gas: incremental, graph-based clustering.
//!
//! A gas is a sparse graph of prototype nodes. Fed a stream of sample
//! points, it inserts nodes where the data is poorly covered, pulls
//! existing nodes toward the data elsewhere, ages and prunes edges, and can
//! merge nodes that drift too close together. Node density ends up
//! tracking the sample distribution.
//!
//! ## Quick Start
//!
//! ```rust
//! use gwr::prelude::*;
//!
//! let sample: Vec<[f64; 2]> = (0..200)
//!     .map(|i| {
//!         let t = i as f64 / 200.0 * std::f64::consts::TAU;
//!         [t.cos(), t.sin()]
//!     })
//!     .collect();
//!
//! let config = GasConfig::default().with_batch_size(100);
//! let mut gas = Gas::with_config(&sample, config).unwrap();
//! let outcome = gas
//!     .train(&sample, TrainingConfig::default().with_seed(7).with_pass_count(1.0, 3.0))
//!     .unwrap();
//!
//! assert_eq!(outcome.residuals.len(), outcome.batches.len() * 100);
//! assert!(gas.graph().node_count() >= 1);
//! ```
//!
//! ## Architecture
//!
//! - [`gwr_core`]: graph capability trait, distance oracle, habituation, errors
//! - [`gwr_runtime`]: backends, engine, trainer, collapser, snapshot export

pub use gwr_core;
pub use gwr_runtime;

pub mod prelude {
    //! Everything needed to build and train a gas.
    pub use gwr_runtime::prelude::*;
}
