//! Snapshot exporter: a plain, serializable picture of a gas graph.
//!
//! Nodes carry their final weights and habituation counters, edges their
//! endpoints and ages. Suitable for plotting or downstream analysis.

use gwr_core::error::Result;
use gwr_core::graph::GasGraph;
use gwr_core::types::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// A graph node in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub weight: Vec<f64>,
    pub habituation_counter: u64,
}

/// A graph edge in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub age: u64,
}

/// The whole graph at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Node weights as rows, in node order.
    pub fn weights(&self) -> Vec<Vec<f64>> {
        self.nodes.iter().map(|n| n.weight.clone()).collect()
    }
}

/// Capture every node and edge of `graph`.
pub fn snapshot<G: GasGraph + ?Sized>(graph: &G) -> Result<GraphSnapshot> {
    let mut nodes = Vec::with_capacity(graph.node_count());
    for id in graph.node_ids() {
        let data = graph.node(id)?;
        nodes.push(NodeSnapshot {
            id,
            weight: data.weight.clone(),
            habituation_counter: data.habituation_counter,
        });
    }

    let mut edges = Vec::with_capacity(graph.edge_count());
    for id in graph.edge_ids() {
        let (from, to) = graph.endpoints(id)?;
        edges.push(EdgeSnapshot {
            id,
            from,
            to,
            age: graph.edge(id)?.age,
        });
    }

    Ok(GraphSnapshot { nodes, edges })
}

/// Aggregate figures for a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub mean_degree: f64,
    pub mean_edge_age: f64,
    pub max_edge_age: u64,
}

pub fn graph_stats<G: GasGraph + ?Sized>(graph: &G) -> Result<GraphStats> {
    let nodes = graph.node_count();
    let edges = graph.edge_count();
    let mut total_age = 0u64;
    let mut max_edge_age = 0u64;
    for id in graph.edge_ids() {
        let age = graph.edge(id)?.age;
        total_age += age;
        max_edge_age = max_edge_age.max(age);
    }

    Ok(GraphStats {
        nodes,
        edges,
        mean_degree: if nodes == 0 { 0.0 } else { 2.0 * edges as f64 / nodes as f64 },
        mean_edge_age: if edges == 0 { 0.0 } else { total_age as f64 / edges as f64 },
        max_edge_age,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology_impl::PetGasGraph;
    use gwr_core::types::{EdgeData, NodeData};

    fn triangle() -> PetGasGraph {
        let mut g = PetGasGraph::new();
        let a = g.add_node(NodeData::new(vec![0.0, 0.0]));
        let b = g.add_node(NodeData::new(vec![1.0, 0.0]));
        let c = g.add_node(NodeData::new(vec![0.0, 1.0]));
        g.connect(a, b, EdgeData::with_age(2)).unwrap();
        g.connect(b, c, EdgeData::with_age(4)).unwrap();
        g.connect(c, a, EdgeData::with_age(6)).unwrap();
        g
    }

    #[test]
    fn snapshot_captures_everything() {
        let snap = snapshot(&triangle()).unwrap();
        assert_eq!(snap.nodes.len(), 3);
        assert_eq!(snap.edges.len(), 3);
        assert_eq!(snap.weights()[1], vec![1.0, 0.0]);
        // endpoints are reported lower id first
        assert!(snap.edges.iter().all(|e| e.from < e.to));
    }

    #[test]
    fn snapshot_json_round_trip() {
        let snap = snapshot(&triangle()).unwrap();
        let back: GraphSnapshot = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn stats() {
        let s = graph_stats(&triangle()).unwrap();
        assert_eq!((s.nodes, s.edges), (3, 3));
        assert_eq!(s.mean_degree, 2.0);
        assert_eq!(s.mean_edge_age, 4.0);
        assert_eq!(s.max_edge_age, 6);
    }
}
