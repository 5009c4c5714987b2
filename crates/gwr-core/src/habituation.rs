//! Habituation: how "fresh" a node still is.
//!
//! Each time a node takes part in a habituation pass its counter grows, and
//! its freshness decays along an exponential schedule:
//!
//! ```text
//! h(t) = H0 - (1 - exp(-alpha * t / tau)) / alpha
//! ```
//!
//! `h(0) = H0` and `h(t)` falls toward `H0 - 1/alpha`. The nearest node and
//! its neighbors follow separate `(alpha, tau)` pairs.

use crate::types::Slot;
use serde::{Deserialize, Serialize};

/// Habituation schedule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Habituation {
    /// Freshness of a node that was never habituated.
    pub initial: f64,
    /// Asymptotic decay per slot (`[nearest, neighbor]`).
    pub alpha: [f64; 2],
    /// Time constant per slot, counted in iterations.
    pub tau: [f64; 2],
}

impl Default for Habituation {
    fn default() -> Self {
        Self {
            initial: 1.0,
            alpha: [1.05, 1.05],
            tau: [3.33, 14.33],
        }
    }
}

impl Habituation {
    pub fn new(initial: f64, alpha: [f64; 2], tau: [f64; 2]) -> Self {
        Self { initial, alpha, tau }
    }

    /// Freshness after `t` habituation passes.
    pub fn freshness(&self, t: u64, slot: Slot) -> f64 {
        self.freshness_at(t as f64, slot)
    }

    /// Same as [`freshness`](Self::freshness) for a real-valued counter.
    pub fn freshness_at(&self, t: f64, slot: Slot) -> f64 {
        let i = slot.index();
        let alpha = self.alpha[i];
        self.initial - (1.0 - (-alpha * t / self.tau[i]).exp()) / alpha
    }

    /// The value freshness converges to as the counter grows.
    pub fn floor(&self, slot: Slot) -> f64 {
        self.initial - 1.0 / self.alpha[slot.index()]
    }

    /// Freshness for counters `0..t_max`.
    pub fn curve(&self, slot: Slot, t_max: u64) -> Vec<f64> {
        (0..t_max).map(|t| self.freshness(t, slot)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial() {
        let h = Habituation::default();
        assert_eq!(h.freshness(0, Slot::Nearest), 1.0);
        assert_eq!(h.freshness(0, Slot::Neighbor), 1.0);
    }

    #[test]
    fn decreases_monotonically() {
        let h = Habituation::default();
        for slot in [Slot::Nearest, Slot::Neighbor] {
            let curve = h.curve(slot, 500);
            for w in curve.windows(2) {
                assert!(w[1] <= w[0], "{:?}: {} then {}", slot, w[0], w[1]);
            }
        }
    }

    #[test]
    fn stays_above_floor() {
        let h = Habituation::default();
        for slot in [Slot::Nearest, Slot::Neighbor] {
            let floor = h.floor(slot);
            assert!(h.freshness(10_000, slot) >= floor);
            assert!((h.freshness(10_000, slot) - floor).abs() < 1e-9);
        }
    }

    #[test]
    fn neighbor_slot_decays_slower() {
        let h = Habituation::default();
        assert!(h.freshness(5, Slot::Neighbor) > h.freshness(5, Slot::Nearest));
    }

    #[test]
    fn matches_closed_form() {
        let h = Habituation::new(1.0, [2.0, 1.05], [4.0, 14.33]);
        let expected = 1.0 - (1.0 - (-2.0f64 * 3.0 / 4.0).exp()) / 2.0;
        assert!((h.freshness(3, Slot::Nearest) - expected).abs() < 1e-15);
    }
}
