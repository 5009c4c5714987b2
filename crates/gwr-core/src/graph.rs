//! Graph capability: the store the gas grows in.
//!
//! The engine never touches a storage type directly. Everything it needs
//! from the graph is on [`GasGraph`], so array-backed and petgraph-backed
//! stores are interchangeable.

use crate::distance::SquareDistances;
use crate::error::Result;
use crate::types::*;

/// A mutable undirected graph of prototype nodes.
///
/// Implementations must uphold:
/// - every edge joins two distinct existing nodes,
/// - at most one edge per unordered pair,
/// - `node_ids` and `incident_edges` come back in ascending id order.
///
/// Misuse (self loops, unknown ids, double deletes) returns
/// [`GasError::GraphInvariantViolation`](crate::error::GasError::GraphInvariantViolation).
pub trait GasGraph {
    /// Add a node and return its handle.
    fn add_node(&mut self, data: NodeData) -> NodeId;

    /// Remove a node together with all its incident edges.
    fn remove_node(&mut self, id: NodeId) -> Result<NodeData>;

    fn has_node(&self, id: NodeId) -> bool;

    /// Get node data by handle.
    fn node(&self, id: NodeId) -> Result<&NodeData>;

    /// Get mutable node data by handle.
    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData>;

    /// Connect two nodes. If they are already connected the existing edge
    /// is returned untouched and `data` is dropped.
    fn connect(&mut self, a: NodeId, b: NodeId, data: EdgeData) -> Result<EdgeId>;

    /// Remove the edge between two nodes, if any.
    fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<Option<EdgeData>>;

    /// Remove an edge by handle.
    fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeData>;

    fn edge(&self, id: EdgeId) -> Result<&EdgeData>;

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData>;

    /// Both endpoints of an edge, lower id first.
    fn endpoints(&self, id: EdgeId) -> Result<(NodeId, NodeId)>;

    /// The edge joining two nodes, if they are connected.
    fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId>;

    /// Number of edges incident to a node.
    fn degree(&self, id: NodeId) -> Result<usize>;

    /// All node handles, ascending.
    fn node_ids(&self) -> Vec<NodeId>;

    /// All edge handles, ascending.
    fn edge_ids(&self) -> Vec<EdgeId>;

    /// `(edge, neighbor)` pairs for every edge touching `id`, ascending by neighbor.
    fn incident_edges(&self, id: NodeId) -> Result<Vec<(EdgeId, NodeId)>>;

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.find_edge(a, b).is_some()
    }

    /// Whether a node has no incident edge.
    fn stands_alone(&self, id: NodeId) -> Result<bool> {
        Ok(self.degree(id)? == 0)
    }

    /// Neighbors of a node, ascending.
    fn neighbors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .incident_edges(id)?
            .into_iter()
            .map(|(_, n)| n)
            .collect())
    }

    /// Squared distance from `query` to every node weight.
    ///
    /// `query_sq_norm` may carry a precomputed `|query|^2`; backends then use
    /// the `|w|^2 - 2 w.q + |q|^2` expansion.
    fn square_distances(&self, query: &[f64], query_sq_norm: Option<f64>) -> SquareDistances {
        let ids = self.node_ids();
        let weights = ids
            .iter()
            .filter_map(|&id| self.node(id).ok().map(|n| (id, n.weight.as_slice())));
        SquareDistances::compute(query, query_sq_norm, weights)
    }
}

impl<G: GasGraph + ?Sized> GasGraph for Box<G> {
    fn add_node(&mut self, data: NodeData) -> NodeId {
        (**self).add_node(data)
    }

    fn remove_node(&mut self, id: NodeId) -> Result<NodeData> {
        (**self).remove_node(id)
    }

    fn has_node(&self, id: NodeId) -> bool {
        (**self).has_node(id)
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        (**self).node(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        (**self).node_mut(id)
    }

    fn connect(&mut self, a: NodeId, b: NodeId, data: EdgeData) -> Result<EdgeId> {
        (**self).connect(a, b, data)
    }

    fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<Option<EdgeData>> {
        (**self).disconnect(a, b)
    }

    fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeData> {
        (**self).remove_edge(id)
    }

    fn edge(&self, id: EdgeId) -> Result<&EdgeData> {
        (**self).edge(id)
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData> {
        (**self).edge_mut(id)
    }

    fn endpoints(&self, id: EdgeId) -> Result<(NodeId, NodeId)> {
        (**self).endpoints(id)
    }

    fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        (**self).find_edge(a, b)
    }

    fn degree(&self, id: NodeId) -> Result<usize> {
        (**self).degree(id)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        (**self).node_ids()
    }

    fn edge_ids(&self) -> Vec<EdgeId> {
        (**self).edge_ids()
    }

    fn incident_edges(&self, id: NodeId) -> Result<Vec<(EdgeId, NodeId)>> {
        (**self).incident_edges(id)
    }

    fn node_count(&self) -> usize {
        (**self).node_count()
    }

    fn edge_count(&self) -> usize {
        (**self).edge_count()
    }

    fn square_distances(&self, query: &[f64], query_sq_norm: Option<f64>) -> SquareDistances {
        (**self).square_distances(query, query_sq_norm)
    }
}

/// Check the node/edge invariants of a whole graph.
///
/// Returns the first violation found: an edge with a missing or repeated
/// endpoint, or a node whose weight does not have `dim` components.
pub fn check_invariants<G: GasGraph + ?Sized>(graph: &G, dim: usize) -> Result<()> {
    use crate::error::{GasError, GraphViolation};

    for e in graph.edge_ids() {
        let (a, b) = graph.endpoints(e)?;
        if a == b {
            return Err(GasError::self_loop(a));
        }
        if !graph.has_node(a) {
            return Err(GasError::unknown_node(a));
        }
        if !graph.has_node(b) {
            return Err(GasError::unknown_node(b));
        }
    }
    for n in graph.node_ids() {
        let found = graph.node(n)?.dim();
        if found != dim {
            return Err(GraphViolation::DimensionMismatch {
                node: n,
                expected: dim,
                found,
            }
            .into());
        }
    }
    Ok(())
}
