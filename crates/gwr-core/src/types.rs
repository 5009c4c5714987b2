//! Shared types used across the gas crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to a node in the gas graph.
///
/// Handles are arena indices: they stay valid for the lifetime of the node
/// and are never shared by two live nodes. Ordering follows the index, which
/// is also the iteration order every backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Stable handle to an edge in the gas graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Attributes carried by a prototype node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Prototype position in sample space.
    pub weight: Vec<f64>,
    /// Number of habituation passes this node took part in.
    pub habituation_counter: u64,
}

impl NodeData {
    /// A fresh node at `weight` with a zero habituation counter.
    pub fn new(weight: Vec<f64>) -> Self {
        Self {
            weight,
            habituation_counter: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.weight.len()
    }
}

/// Attributes carried by a neighbor relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeData {
    /// Habituation passes over either endpoint since the edge was created.
    pub age: u64,
}

impl EdgeData {
    pub fn with_age(age: u64) -> Self {
        Self { age }
    }
}

/// Which habituation schedule applies to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// The node nearest to the current sample point.
    Nearest,
    /// A neighbor of the nearest node.
    Neighbor,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::Nearest => 0,
            Slot::Neighbor => 1,
        }
    }
}

/// Squared Euclidean distance between two vectors of equal length.
pub fn square_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Euclidean distance between two vectors of equal length.
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    square_distance(a, b).sqrt()
}

/// `(1 - l) * a + l * b`, component-wise.
pub fn lerp(a: &[f64], b: &[f64], l: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| (1.0 - l) * x + l * y).collect()
}
