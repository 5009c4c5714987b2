//! Threshold policies.
//!
//! The insertion and collapse thresholds are either a fixed number or a
//! caller-supplied function of the current sample point and the weight of
//! the node it is being compared against.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Signature of a custom threshold: `(point, node_weight) -> threshold`.
pub type ThresholdFn = dyn Fn(&[f64], &[f64]) -> f64 + Send + Sync;

/// A threshold that may depend on where in sample space it is evaluated.
#[derive(Clone)]
pub enum ThresholdPolicy {
    Fixed(f64),
    Custom(Arc<ThresholdFn>),
}

impl ThresholdPolicy {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64], &[f64]) -> f64 + Send + Sync + 'static,
    {
        ThresholdPolicy::Custom(Arc::new(f))
    }

    /// Evaluate the threshold at `point` against `weight`.
    pub fn eval(&self, point: &[f64], weight: &[f64]) -> f64 {
        match self {
            ThresholdPolicy::Fixed(v) => *v,
            ThresholdPolicy::Custom(f) => f(point, weight),
        }
    }

    /// The scalar value, when the policy is not a closure.
    pub fn fixed_value(&self) -> Option<f64> {
        match self {
            ThresholdPolicy::Fixed(v) => Some(*v),
            ThresholdPolicy::Custom(_) => None,
        }
    }
}

impl From<f64> for ThresholdPolicy {
    fn from(v: f64) -> Self {
        ThresholdPolicy::Fixed(v)
    }
}

impl fmt::Debug for ThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdPolicy::Fixed(v) => write!(f, "Fixed({})", v),
            ThresholdPolicy::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

// Fixed policies travel as plain numbers; closures cannot be serialized and
// come out as `null`.
impl Serialize for ThresholdPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ThresholdPolicy::Fixed(v) => serializer.serialize_f64(*v),
            ThresholdPolicy::Custom(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ThresholdPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(ThresholdPolicy::Fixed)
    }
}
