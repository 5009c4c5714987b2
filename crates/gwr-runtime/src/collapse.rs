//! Collapse: merge neighboring nodes that ended up too close together.
//!
//! One pass over the current nodes. For each node `n`, the closest neighbor
//! `m` with a higher id is merged into `n` when their distance is below the
//! collapse threshold. `n` moves to the midpoint and takes over all of `m`'s
//! edges; where both had an edge to the same neighbor, the younger age wins.

use crate::gas::Gas;
use gwr_core::error::Result;
use gwr_core::graph::GasGraph;
use gwr_core::policy::ThresholdPolicy;
use gwr_core::types::*;
use tracing::debug;

/// Which nodes one collapse pass merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseReport {
    /// `(kept, absorbed)` pairs, in merge order.
    pub merged: Vec<(NodeId, NodeId)>,
}

impl CollapseReport {
    /// Number of nodes removed by the pass.
    pub fn removed(&self) -> usize {
        self.merged.len()
    }
}

/// Run a single collapse pass over `graph`.
///
/// The policy is evaluated with the weight of `n` in the point position and
/// the weight of its closest later neighbor in the node position.
pub fn collapse<G: GasGraph + ?Sized>(graph: &mut G, below: &ThresholdPolicy) -> Result<CollapseReport> {
    let mut report = CollapseReport::default();

    for n in graph.node_ids() {
        if !graph.has_node(n) {
            continue;
        }
        let w_n = graph.node(n)?.weight.clone();

        let mut closest: Option<(NodeId, f64)> = None;
        for m in graph.neighbors(n)? {
            if m <= n {
                continue;
            }
            let d = distance(&w_n, &graph.node(m)?.weight);
            // neighbors come sorted, so strict < keeps the lower id on ties
            if closest.map_or(true, |(_, best)| d < best) {
                closest = Some((m, d));
            }
        }

        if let Some((m, d)) = closest {
            if d < below.eval(&w_n, &graph.node(m)?.weight) {
                merge_nodes(graph, n, m)?;
                report.merged.push((n, m));
            }
        }
    }

    if !report.merged.is_empty() {
        debug!("collapsed {} node pair(s)", report.removed());
    }
    Ok(report)
}

/// Merge `absorbed` into `kept` and delete `absorbed`.
pub fn merge_nodes<G: GasGraph + ?Sized>(graph: &mut G, kept: NodeId, absorbed: NodeId) -> Result<()> {
    graph.disconnect(kept, absorbed)?;

    let w_absorbed = graph.node(absorbed)?.weight.clone();
    for (w, a) in graph.node_mut(kept)?.weight.iter_mut().zip(&w_absorbed) {
        *w = (*w + a) / 2.0;
    }

    for (edge, other) in graph.incident_edges(absorbed)? {
        let age = graph.edge(edge)?.age;
        match graph.find_edge(kept, other) {
            Some(existing) => {
                let data = graph.edge_mut(existing)?;
                data.age = data.age.min(age);
            }
            None => {
                graph.connect(kept, other, EdgeData::with_age(age))?;
            }
        }
    }

    graph.remove_node(absorbed)?;
    Ok(())
}

impl<G: GasGraph> Gas<G> {
    /// Merge adjacent nodes closer than `collapse_below`.
    ///
    /// A no-op when no collapse threshold is configured.
    pub fn collapse(&mut self) -> Result<CollapseReport> {
        match self.config().collapse_below.clone() {
            Some(below) => collapse(self.graph_mut(), &below),
            None => Ok(CollapseReport::default()),
        }
    }
}
