//! Gas: the Growing-When-Required engine.
//!
//! The gas owns a graph of prototype nodes and folds sample points into it
//! one at a time. For each point:
//! 1. Find the nearest and second-nearest nodes
//! 2. If the nearest node is too far away (low activity) and already
//!    habituated, insert a new node between it and the point
//! 3. Otherwise pull the nearest node and its neighbors toward the point
//! 4. Habituate the nearest node: age its edges, prune edges that outlived
//!    `edge_lifetime`, and drop nodes left without neighbors
//!
//! Points are processed strictly in order; later points see the graph as
//! earlier points left it.

use crate::config::GasConfig;
use crate::topology_impl::PetGasGraph;
use gwr_core::error::{GasError, Result};
use gwr_core::graph::GasGraph;
use gwr_core::types::*;
use tracing::{debug, warn};

/// What a single sample point did to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Inserted(NodeId),
    Adapted,
}

/// Counters accumulated over one call to [`Gas::batch_train`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub insertions: usize,
    pub adaptations: usize,
    pub pruned_edges: usize,
    pub removed_nodes: usize,
}

/// A growing neural gas over graph backend `G`.
pub struct Gas<G: GasGraph = PetGasGraph> {
    graph: G,
    config: GasConfig,
    dim: usize,
    last_counts: BatchCounts,
}

impl Gas<PetGasGraph> {
    /// Seed a gas from a sample with default parameters.
    ///
    /// The first and last rows become the two initial nodes, joined by one
    /// edge of age 0.
    pub fn new<R: AsRef<[f64]>>(sample: &[R]) -> Result<Self> {
        Self::with_config(sample, GasConfig::default())
    }

    pub fn with_config<R: AsRef<[f64]>>(sample: &[R], config: GasConfig) -> Result<Self> {
        Self::with_graph(sample, config, PetGasGraph::new())
    }
}

impl<G: GasGraph> Gas<G> {
    /// Seed a gas inside a caller-supplied empty graph.
    pub fn with_graph<R: AsRef<[f64]>>(sample: &[R], config: GasConfig, mut graph: G) -> Result<Self> {
        config.validate()?;
        if sample.len() < 2 {
            return Err(GasError::invalid_input(format!(
                "need at least 2 sample points to seed the gas, got {}",
                sample.len()
            )));
        }
        if graph.node_count() != 0 {
            return Err(GasError::invalid_input("seed graph must be empty"));
        }
        let dim = check_rows(sample, None)?;

        let first = graph.add_node(NodeData::new(sample[0].as_ref().to_vec()));
        let last = graph.add_node(NodeData::new(sample[sample.len() - 1].as_ref().to_vec()));
        graph.connect(first, last, EdgeData::default())?;

        Ok(Self {
            graph,
            config,
            dim,
            last_counts: BatchCounts::default(),
        })
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn into_graph(self) -> G {
        self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn config(&self) -> &GasConfig {
        &self.config
    }

    /// Change parameters between batches.
    pub fn set_config(&mut self, config: GasConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Dimensionality of the sample space.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Counters from the most recent [`batch_train`](Self::batch_train).
    pub fn last_counts(&self) -> BatchCounts {
        self.last_counts
    }

    /// Current freshness of a node under the given schedule slot.
    pub fn habituation_of(&self, node: NodeId, slot: Slot) -> Result<f64> {
        let counter = self.graph.node(node)?.habituation_counter;
        Ok(self.config.habituation().freshness(counter, slot))
    }

    /// Grow and adapt the gas over a batch of points.
    ///
    /// Returns one residual per point: the distance from the point to its
    /// nearest node before the graph was updated for it.
    pub fn batch_train<R: AsRef<[f64]>>(&mut self, points: &[R]) -> Result<Vec<f64>> {
        check_rows(points, Some(self.dim))?;
        let mut counts = BatchCounts::default();
        let mut residuals = Vec::with_capacity(points.len());

        for eta in points {
            let (residual, kind) = self.step(eta.as_ref(), &mut counts)?;
            match kind {
                StepKind::Inserted(_) => counts.insertions += 1,
                StepKind::Adapted => counts.adaptations += 1,
            }
            residuals.push(residual);
        }

        debug!(
            "batch of {}: {} inserted, {} adapted, {} edges pruned, {} nodes removed, {} nodes now",
            points.len(),
            counts.insertions,
            counts.adaptations,
            counts.pruned_edges,
            counts.removed_nodes,
            self.graph.node_count()
        );
        self.last_counts = counts;
        Ok(residuals)
    }

    /// Process one point. Returns its residual and the branch taken.
    fn step(&mut self, eta: &[f64], counts: &mut BatchCounts) -> Result<(f64, StepKind)> {
        let found = self
            .graph
            .square_distances(eta, None)
            .two_nearest()
            .ok_or(GasError::EmptyGraph)?;
        let nearest = found.nearest;
        let dist_min = found.distance();

        let activity = (-dist_min).exp();
        let habituation = self.config.habituation();
        let node = self.graph.node(nearest)?;
        let freshness = habituation.freshness(node.habituation_counter, Slot::Nearest);
        let w = node.weight.clone();

        let kind = if activity < self.config.insertion_threshold.eval(eta, &w)
            && freshness < self.config.habituation_threshold
        {
            if let Some(second) = found.second {
                self.graph.disconnect(nearest, second)?;
            }
            let l = 0.5 + self.config.trust / 2.0;
            let inserted = self.graph.add_node(NodeData::new(lerp(&w, eta, l)));
            self.graph.connect(inserted, nearest, EdgeData::default())?;
            if let Some(second) = found.second {
                self.graph.connect(inserted, second, EdgeData::default())?;
            }
            StepKind::Inserted(inserted)
        } else {
            if let Some(second) = found.second {
                self.graph.connect(nearest, second, EdgeData::default())?;
            }
            let [lr_nearest, lr_neighbor] = self.config.learning_rate;
            move_toward(&mut self.graph.node_mut(nearest)?.weight, eta, lr_nearest * freshness);
            for i in self.graph.neighbors(nearest)? {
                let neighbor = self.graph.node_mut(i)?;
                let h = habituation.freshness(neighbor.habituation_counter, Slot::Neighbor);
                move_toward(&mut neighbor.weight, eta, lr_neighbor * h);
            }
            StepKind::Adapted
        };

        self.habituate(nearest, counts)?;
        Ok((dist_min, kind))
    }

    /// Habituate `node` and its neighbors, pruning edges past their lifetime.
    fn habituate(&mut self, node: NodeId, counts: &mut BatchCounts) -> Result<()> {
        self.graph.node_mut(node)?.habituation_counter += 1;

        // snapshot: pruning below mutates the incident set
        for (edge, neighbor) in self.graph.incident_edges(node)? {
            let age = {
                let data = self.graph.edge_mut(edge)?;
                data.age += 1;
                data.age
            };
            self.graph.node_mut(neighbor)?.habituation_counter += 1;

            if age > self.config.edge_lifetime {
                self.graph.remove_edge(edge)?;
                counts.pruned_edges += 1;
                if self.graph.stands_alone(neighbor)? {
                    self.graph.remove_node(neighbor)?;
                    counts.removed_nodes += 1;
                }
            }
        }

        // the last node stays, so the next point still has a match
        if self.graph.node_count() > 1 && self.graph.stands_alone(node)? {
            self.graph.remove_node(node)?;
            counts.removed_nodes += 1;
        }
        if self.graph.node_count() < 2 {
            warn!(
                "gas shrank to {} node(s); edge_lifetime {} may be too short",
                self.graph.node_count(),
                self.config.edge_lifetime
            );
        }
        Ok(())
    }
}

/// `w += rate * (eta - w)`, component-wise.
fn move_toward(w: &mut [f64], eta: &[f64], rate: f64) {
    for (wi, ei) in w.iter_mut().zip(eta) {
        *wi += rate * (ei - *wi);
    }
}

/// Check that every row has the same, non-zero dimension and return it.
pub(crate) fn check_rows<R: AsRef<[f64]>>(rows: &[R], expected: Option<usize>) -> Result<usize> {
    let dim = match (expected, rows.first()) {
        (Some(d), _) => d,
        (None, Some(r)) => r.as_ref().len(),
        (None, None) => return Err(GasError::invalid_input("sample is empty")),
    };
    if dim == 0 {
        return Err(GasError::invalid_input("sample points must have at least one component"));
    }
    if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.as_ref().len() != dim) {
        return Err(GasError::invalid_input(format!(
            "row {} has {} components, expected {}",
            i,
            r.as_ref().len(),
            dim
        )));
    }
    Ok(dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwr_core::graph::check_invariants;

    fn seed() -> Gas {
        Gas::new(&[[0.0, 0.0], [10.0, 10.0]]).unwrap()
    }

    #[test]
    fn seeds_two_nodes_and_one_edge() {
        let gas = seed();
        let g = gas.graph();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        let e = g.edge_ids()[0];
        assert_eq!(g.edge(e).unwrap().age, 0);
        let weights: Vec<Vec<f64>> = g
            .node_ids()
            .into_iter()
            .map(|n| g.node(n).unwrap().weight.clone())
            .collect();
        assert_eq!(weights, vec![vec![0.0, 0.0], vec![10.0, 10.0]]);
    }

    #[test]
    fn single_point_sample_is_rejected() {
        let err = Gas::new(&[[1.0, 2.0]]).err().unwrap();
        assert!(matches!(err, GasError::InvalidInput(_)));
        let empty: [[f64; 2]; 0] = [];
        assert!(Gas::new(&empty).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(matches!(Gas::new(&rows), Err(GasError::InvalidInput(_))));

        let mut gas = seed();
        assert!(gas.batch_train(&[[1.0, 2.0, 3.0]]).is_err());
    }

    #[test]
    fn adaptation_moves_nearest_toward_point() {
        // insertion_threshold 0 never fires
        let config = GasConfig::default().with_insertion_threshold(0.0);
        let mut gas = Gas::with_config(&[[0.0, 0.0], [10.0, 10.0]], config).unwrap();
        let residuals = gas.batch_train(&[[1.0, 0.0]]).unwrap();

        assert_eq!(residuals, vec![1.0]);
        let g = gas.graph();
        let ids = g.node_ids();
        // freshness 1.0 at counter 0, learning rate 0.2
        assert!((g.node(ids[0]).unwrap().weight[0] - 0.2).abs() < 1e-12);
        // neighbor moves by 0.006 * 1.0 of its offset
        let w1 = &g.node(ids[1]).unwrap().weight;
        assert!((w1[0] - (10.0 + 0.006 * (1.0 - 10.0))).abs() < 1e-12);
        assert!((w1[1] - (10.0 + 0.006 * (0.0 - 10.0))).abs() < 1e-12);
        assert_eq!(gas.last_counts().adaptations, 1);
    }

    #[test]
    fn habituation_counts_and_ages() {
        let config = GasConfig::default().with_insertion_threshold(0.0);
        let mut gas = Gas::with_config(&[[0.0, 0.0], [10.0, 10.0]], config).unwrap();
        gas.batch_train(&[[0.0, 0.0], [0.0, 0.0], [0.0, 0.0]]).unwrap();

        let g = gas.graph();
        let ids = g.node_ids();
        assert_eq!(g.node(ids[0]).unwrap().habituation_counter, 3);
        assert_eq!(g.node(ids[1]).unwrap().habituation_counter, 3);
        assert_eq!(g.edge(g.edge_ids()[0]).unwrap().age, 3);
        assert!(gas.habituation_of(ids[0], Slot::Nearest).unwrap() < 1.0);
    }

    #[test]
    fn trust_one_inserts_at_the_point() {
        let config = GasConfig::default()
            .with_insertion_threshold(1.0)
            .with_trust(1.0);
        let mut gas = Gas::with_config(&[[0.0, 0.0], [10.0, 10.0]], config).unwrap();
        gas.batch_train(&[[3.0, 1.0]]).unwrap();

        let g = gas.graph();
        assert_eq!(g.node_count(), 3);
        let inserted = *g.node_ids().last().unwrap();
        assert_eq!(g.node(inserted).unwrap().weight, vec![3.0, 1.0]);
        check_invariants(g, 2).unwrap();
    }

    #[test]
    fn habituation_threshold_blocks_fresh_insertion() {
        // a fresh node has freshness 1.0, which is not below 0.5
        let config = GasConfig::default()
            .with_insertion_threshold(1.0)
            .with_habituation_threshold(0.5);
        let mut gas = Gas::with_config(&[[0.0, 0.0], [10.0, 10.0]], config).unwrap();
        gas.batch_train(&[[3.0, 1.0]]).unwrap();
        assert_eq!(gas.graph().node_count(), 2);
        assert_eq!(gas.last_counts().insertions, 0);
    }

    #[test]
    fn custom_insertion_policy_sees_point() {
        let config = GasConfig::default().with_insertion_threshold(
            gwr_core::policy::ThresholdPolicy::custom(|eta, _| if eta[0] > 4.0 { 1.0 } else { 0.0 }),
        );
        let mut gas = Gas::with_config(&[[0.0, 0.0], [10.0, 10.0]], config).unwrap();
        gas.batch_train(&[[1.0, 1.0]]).unwrap();
        assert_eq!(gas.graph().node_count(), 2);
        gas.batch_train(&[[6.0, 6.0]]).unwrap();
        assert_eq!(gas.graph().node_count(), 3);
    }
}
