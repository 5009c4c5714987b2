//! Array-backed GasGraph.
//!
//! Nodes and edges live in two slabs of optional slots with free lists.
//! Each node keeps an ordered adjacency map from neighbor to edge, so
//! degree checks are O(1) and neighbor iteration is already sorted.

use gwr_core::error::{GasError, Result};
use gwr_core::graph::GasGraph;
use gwr_core::types::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct NodeEntry {
    data: NodeData,
    adjacency: BTreeMap<NodeId, EdgeId>,
}

#[derive(Debug, Clone)]
struct EdgeEntry {
    a: NodeId,
    b: NodeId,
    data: EdgeData,
}

/// Slab-allocated gas graph.
#[derive(Debug, Clone, Default)]
pub struct ArrayGasGraph {
    nodes: Vec<Option<NodeEntry>>,
    edges: Vec<Option<EdgeEntry>>,
    free_nodes: Vec<u32>,
    free_edges: Vec<u32>,
    node_count: usize,
    edge_count: usize,
}

impl ArrayGasGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate room for `nodes` nodes and `edges` edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
            ..Self::default()
        }
    }

    fn entry(&self, id: NodeId) -> Result<&NodeEntry> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| GasError::unknown_node(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut NodeEntry> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| GasError::unknown_node(id))
    }

    fn edge_entry(&self, id: EdgeId) -> Result<&EdgeEntry> {
        self.edges
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| GasError::unknown_edge(id))
    }

    fn take_edge(&mut self, id: EdgeId) -> Result<EdgeEntry> {
        let entry = self
            .edges
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or_else(|| GasError::unknown_edge(id))?;
        self.free_edges.push(id.0);
        self.edge_count -= 1;
        Ok(entry)
    }
}

impl GasGraph for ArrayGasGraph {
    fn add_node(&mut self, data: NodeData) -> NodeId {
        let entry = NodeEntry {
            data,
            adjacency: BTreeMap::new(),
        };
        self.node_count += 1;
        match self.free_nodes.pop() {
            Some(slot) => {
                self.nodes[slot as usize] = Some(entry);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(entry));
                NodeId((self.nodes.len() - 1) as u32)
            }
        }
    }

    fn remove_node(&mut self, id: NodeId) -> Result<NodeData> {
        let entry = self
            .nodes
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or_else(|| GasError::unknown_node(id))?;
        for (neighbor, edge) in entry.adjacency {
            self.take_edge(edge)?;
            self.entry_mut(neighbor)?.adjacency.remove(&id);
        }
        self.free_nodes.push(id.0);
        self.node_count -= 1;
        Ok(entry.data)
    }

    fn has_node(&self, id: NodeId) -> bool {
        self.entry(id).is_ok()
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.entry(id).map(|e| &e.data)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.entry_mut(id).map(|e| &mut e.data)
    }

    fn connect(&mut self, a: NodeId, b: NodeId, data: EdgeData) -> Result<EdgeId> {
        if a == b {
            return Err(GasError::self_loop(a));
        }
        self.entry(b)?;
        if let Some(&existing) = self.entry(a)?.adjacency.get(&b) {
            return Ok(existing);
        }

        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let entry = EdgeEntry { a: lo, b: hi, data };
        let id = match self.free_edges.pop() {
            Some(slot) => {
                self.edges[slot as usize] = Some(entry);
                EdgeId(slot)
            }
            None => {
                self.edges.push(Some(entry));
                EdgeId((self.edges.len() - 1) as u32)
            }
        };
        self.edge_count += 1;
        self.entry_mut(a)?.adjacency.insert(b, id);
        self.entry_mut(b)?.adjacency.insert(a, id);
        Ok(id)
    }

    fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<Option<EdgeData>> {
        self.entry(b)?;
        let Some(edge) = self.entry_mut(a)?.adjacency.remove(&b) else {
            return Ok(None);
        };
        self.entry_mut(b)?.adjacency.remove(&a);
        Ok(Some(self.take_edge(edge)?.data))
    }

    fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeData> {
        let entry = self.take_edge(id)?;
        self.entry_mut(entry.a)?.adjacency.remove(&entry.b);
        self.entry_mut(entry.b)?.adjacency.remove(&entry.a);
        Ok(entry.data)
    }

    fn edge(&self, id: EdgeId) -> Result<&EdgeData> {
        self.edge_entry(id).map(|e| &e.data)
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData> {
        self.edges
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .map(|e| &mut e.data)
            .ok_or_else(|| GasError::unknown_edge(id))
    }

    fn endpoints(&self, id: EdgeId) -> Result<(NodeId, NodeId)> {
        self.edge_entry(id).map(|e| (e.a, e.b))
    }

    fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.entry(a).ok()?.adjacency.get(&b).copied()
    }

    fn degree(&self, id: NodeId) -> Result<usize> {
        self.entry(id).map(|e| e.adjacency.len())
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| EdgeId(i as u32))
            .collect()
    }

    fn incident_edges(&self, id: NodeId) -> Result<Vec<(EdgeId, NodeId)>> {
        Ok(self
            .entry(id)?
            .adjacency
            .iter()
            .map(|(&n, &e)| (e, n))
            .collect())
    }

    fn node_count(&self) -> usize {
        self.node_count
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }
}
