//! Distance oracle: squared distances from a query to every node.
//!
//! The result keeps distances in a flat array and remembers which node each
//! position belongs to, so callers can sort or select on the array and map
//! positions back to handles afterwards.

use crate::types::NodeId;
use std::cmp::Ordering;

/// Squared distances from one query vector to a set of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareDistances {
    distances: Vec<f64>,
    nodes: Vec<NodeId>,
}

/// The two closest nodes to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub nearest: NodeId,
    /// Squared distance to `nearest`.
    pub square_distance: f64,
    /// Absent when the graph holds a single node.
    pub second: Option<NodeId>,
}

impl Nearest {
    /// Euclidean distance to the nearest node.
    pub fn distance(&self) -> f64 {
        self.square_distance.sqrt()
    }
}

impl SquareDistances {
    /// Compute squared distances from `query` to each `(id, weight)` pair.
    pub fn compute<'a, I>(query: &[f64], query_sq_norm: Option<f64>, weights: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, &'a [f64])>,
    {
        let mut distances = Vec::new();
        let mut nodes = Vec::new();
        for (id, w) in weights {
            let d = match query_sq_norm {
                Some(q2) => {
                    let (w2, dot) = w
                        .iter()
                        .zip(query)
                        .fold((0.0, 0.0), |(w2, dot), (x, y)| (w2 + x * x, dot + x * y));
                    // the expansion can dip below zero by rounding
                    (w2 - 2.0 * dot + q2).max(0.0)
                }
                None => crate::types::square_distance(w, query),
            };
            distances.push(d);
            nodes.push(id);
        }
        Self { distances, nodes }
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Map positions in the distance array back to node handles.
    pub fn to_nodes(&self, positions: &[usize]) -> Vec<NodeId> {
        positions.iter().map(|&i| self.nodes[i]).collect()
    }

    /// Positions sorted by ascending distance, ties by ascending node id.
    pub fn argsort(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.distances.len()).collect();
        order.sort_by(|&a, &b| self.rank(a, b));
        order
    }

    /// The nearest and second-nearest nodes, or `None` for an empty set.
    ///
    /// Linear scan; agrees with the first two entries of [`argsort`](Self::argsort).
    pub fn two_nearest(&self) -> Option<Nearest> {
        let mut best: Option<usize> = None;
        let mut second: Option<usize> = None;
        for i in 0..self.distances.len() {
            match best {
                None => best = Some(i),
                Some(b) if self.rank(i, b) == Ordering::Less => {
                    second = best;
                    best = Some(i);
                }
                Some(_) => match second {
                    Some(s) if self.rank(i, s) != Ordering::Less => {}
                    _ => second = Some(i),
                },
            }
        }
        best.map(|b| Nearest {
            nearest: self.nodes[b],
            square_distance: self.distances[b],
            second: second.map(|s| self.nodes[s]),
        })
    }

    fn rank(&self, a: usize, b: usize) -> Ordering {
        self.distances[a]
            .partial_cmp(&self.distances[b])
            .unwrap_or(Ordering::Equal)
            .then(self.nodes[a].cmp(&self.nodes[b]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle(query: &[f64], points: &[(u32, [f64; 2])], norm: bool) -> SquareDistances {
        let q2 = norm.then(|| query.iter().map(|x| x * x).sum::<f64>());
        SquareDistances::compute(
            query,
            q2,
            points.iter().map(|(id, w)| (NodeId(*id), w.as_slice())),
        )
    }

    #[test]
    fn computes_squared_distances() {
        let d = oracle(&[0.0, 0.0], &[(0, [3.0, 4.0]), (1, [1.0, 0.0])], false);
        assert_eq!(d.distances(), &[25.0, 1.0]);
        assert_eq!(d.argsort(), vec![1, 0]);
        assert_eq!(d.to_nodes(&[1, 0]), vec![NodeId(1), NodeId(0)]);
    }

    #[test]
    fn precomputed_norm_matches_direct() {
        let pts = [(0, [1.0, 2.0]), (1, [-3.0, 0.5]), (2, [0.0, 0.0])];
        let direct = oracle(&[0.5, -1.0], &pts, false);
        let expanded = oracle(&[0.5, -1.0], &pts, true);
        for (a, b) in direct.distances().iter().zip(expanded.distances()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn ties_go_to_lower_id() {
        let d = oracle(&[5.0, 5.0], &[(4, [10.0, 10.0]), (2, [0.0, 0.0])], false);
        let n = d.two_nearest().unwrap();
        assert_eq!(n.nearest, NodeId(2));
        assert_eq!(n.second, Some(NodeId(4)));
        assert_eq!(d.to_nodes(&d.argsort()[..2]), vec![NodeId(2), NodeId(4)]);
    }

    #[test]
    fn two_nearest_agrees_with_argsort() {
        let pts = [
            (0, [9.0, 9.0]),
            (1, [1.0, 1.0]),
            (2, [0.5, 0.5]),
            (3, [4.0, 4.0]),
            (5, [1.0, 1.0]),
        ];
        let d = oracle(&[0.0, 0.0], &pts, false);
        let n = d.two_nearest().unwrap();
        let sorted = d.to_nodes(&d.argsort());
        assert_eq!(n.nearest, sorted[0]);
        assert_eq!(n.second, Some(sorted[1]));
        assert!((n.distance() - 0.5f64.hypot(0.5)).abs() < 1e-12);
    }

    #[test]
    fn single_node_has_no_second() {
        let d = oracle(&[0.0, 0.0], &[(0, [1.0, 0.0])], false);
        let n = d.two_nearest().unwrap();
        assert_eq!(n.second, None);
        assert!(oracle(&[0.0, 0.0], &[], false).two_nearest().is_none());
    }
}
