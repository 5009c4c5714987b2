//! Concrete implementation of the GasGraph trait using petgraph.
//!
//! Backed by petgraph's `StableGraph`, whose indices survive removals.
//! Node and edge handles are those indices, so no side table is needed to
//! map our ids to the backing store.

use gwr_core::distance::SquareDistances;
use gwr_core::error::{GasError, Result};
use gwr_core::graph::GasGraph;
use gwr_core::types::*;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;

/// Petgraph-backed gas graph.
#[derive(Debug, Clone, Default)]
pub struct PetGasGraph {
    graph: StableUnGraph<NodeData, EdgeData>,
}

fn nx(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.index())
}

fn ex(id: EdgeId) -> EdgeIndex {
    EdgeIndex::new(id.index())
}

fn node_id(idx: NodeIndex) -> NodeId {
    NodeId(idx.index() as u32)
}

fn edge_id(idx: EdgeIndex) -> EdgeId {
    EdgeId(idx.index() as u32)
}

impl PetGasGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn require(&self, id: NodeId) -> Result<NodeIndex> {
        let idx = nx(id);
        if self.graph.contains_node(idx) {
            Ok(idx)
        } else {
            Err(GasError::unknown_node(id))
        }
    }
}

impl GasGraph for PetGasGraph {
    fn add_node(&mut self, data: NodeData) -> NodeId {
        node_id(self.graph.add_node(data))
    }

    fn remove_node(&mut self, id: NodeId) -> Result<NodeData> {
        // petgraph drops incident edges along with the node
        self.graph
            .remove_node(nx(id))
            .ok_or_else(|| GasError::unknown_node(id))
    }

    fn has_node(&self, id: NodeId) -> bool {
        self.graph.contains_node(nx(id))
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.graph
            .node_weight(nx(id))
            .ok_or_else(|| GasError::unknown_node(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.graph
            .node_weight_mut(nx(id))
            .ok_or_else(|| GasError::unknown_node(id))
    }

    fn connect(&mut self, a: NodeId, b: NodeId, data: EdgeData) -> Result<EdgeId> {
        if a == b {
            return Err(GasError::self_loop(a));
        }
        let ia = self.require(a)?;
        let ib = self.require(b)?;

        if let Some(existing) = self.graph.find_edge(ia, ib) {
            return Ok(edge_id(existing));
        }
        Ok(edge_id(self.graph.add_edge(ia, ib, data)))
    }

    fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<Option<EdgeData>> {
        let ia = self.require(a)?;
        let ib = self.require(b)?;
        Ok(self
            .graph
            .find_edge(ia, ib)
            .and_then(|e| self.graph.remove_edge(e)))
    }

    fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeData> {
        self.graph
            .remove_edge(ex(id))
            .ok_or_else(|| GasError::unknown_edge(id))
    }

    fn edge(&self, id: EdgeId) -> Result<&EdgeData> {
        self.graph
            .edge_weight(ex(id))
            .ok_or_else(|| GasError::unknown_edge(id))
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData> {
        self.graph
            .edge_weight_mut(ex(id))
            .ok_or_else(|| GasError::unknown_edge(id))
    }

    fn endpoints(&self, id: EdgeId) -> Result<(NodeId, NodeId)> {
        let (a, b) = self
            .graph
            .edge_endpoints(ex(id))
            .ok_or_else(|| GasError::unknown_edge(id))?;
        let (a, b) = (node_id(a), node_id(b));
        Ok(if a <= b { (a, b) } else { (b, a) })
    }

    fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        let (ia, ib) = (nx(a), nx(b));
        if !self.graph.contains_node(ia) || !self.graph.contains_node(ib) {
            return None;
        }
        self.graph.find_edge(ia, ib).map(edge_id)
    }

    fn degree(&self, id: NodeId) -> Result<usize> {
        let idx = self.require(id)?;
        Ok(self.graph.edges(idx).count())
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.graph.node_indices().map(node_id).collect()
    }

    fn edge_ids(&self) -> Vec<EdgeId> {
        self.graph.edge_indices().map(edge_id).collect()
    }

    fn incident_edges(&self, id: NodeId) -> Result<Vec<(EdgeId, NodeId)>> {
        let idx = self.require(id)?;
        let mut out: Vec<(EdgeId, NodeId)> = self
            .graph
            .edges(idx)
            .map(|edge| {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                (edge_id(edge.id()), node_id(other))
            })
            .collect();
        // petgraph walks adjacency lists newest first
        out.sort_by_key(|&(_, n)| n);
        Ok(out)
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn square_distances(&self, query: &[f64], query_sq_norm: Option<f64>) -> SquareDistances {
        SquareDistances::compute(
            query,
            query_sq_norm,
            self.graph
                .node_indices()
                .map(|idx| (node_id(idx), self.graph[idx].weight.as_slice())),
        )
    }
}
