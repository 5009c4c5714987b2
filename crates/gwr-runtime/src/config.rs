//! Configuration for the gas engine and for training sessions.
//!
//! Both structs deserialize from partial JSON: missing fields take their
//! defaults. Threshold policies travel as plain numbers.

use gwr_core::error::{GasError, Result};
use gwr_core::habituation::Habituation;
use gwr_core::policy::ThresholdPolicy;
use serde::{Deserialize, Serialize};

/// Algorithm parameters owned by one gas engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Activity below this triggers insertion (default: 0.95).
    pub insertion_threshold: ThresholdPolicy,
    /// Where a new node lands between the nearest node (0) and the sample
    /// point (1), past the midpoint (default: 0).
    pub trust: f64,
    /// Learning rates for the nearest node and its neighbors (default: 0.2, 0.006).
    pub learning_rate: [f64; 2],
    /// Freshness below this allows insertion (default: +inf, i.e. always).
    #[serde(with = "infinite_as_null")]
    pub habituation_threshold: f64,
    /// Freshness of a never-habituated node (default: 1).
    pub habituation_initial: f64,
    /// Habituation alpha for nearest/neighbor (default: 1.05, 1.05).
    pub habituation_alpha: [f64; 2],
    /// Habituation tau for nearest/neighbor, in iterations (default: 3.33, 14.33).
    pub habituation_tau: [f64; 2],
    /// Edges older than this are pruned (default: 50).
    pub edge_lifetime: u64,
    /// Points drawn per training batch (default: 1000).
    pub batch_size: usize,
    /// Adjacent nodes closer than this are merged after each batch (default: off).
    pub collapse_below: Option<ThresholdPolicy>,
}

impl Default for GasConfig {
    fn default() -> Self {
        let habituation = Habituation::default();
        Self {
            insertion_threshold: ThresholdPolicy::Fixed(0.95),
            trust: 0.0,
            learning_rate: [0.2, 0.006],
            habituation_threshold: f64::INFINITY,
            habituation_initial: habituation.initial,
            habituation_alpha: habituation.alpha,
            habituation_tau: habituation.tau,
            edge_lifetime: 50,
            batch_size: 1000,
            collapse_below: None,
        }
    }
}

impl GasConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The habituation schedule these parameters describe.
    pub fn habituation(&self) -> Habituation {
        Habituation::new(
            self.habituation_initial,
            self.habituation_alpha,
            self.habituation_tau,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.trust) {
            return Err(GasError::invalid_config("trust", self.trust, "must be in [0, 1]"));
        }
        for (i, lr) in self.learning_rate.iter().enumerate() {
            if !lr.is_finite() || *lr < 0.0 {
                return Err(GasError::invalid_config(
                    &format!("learning_rate[{}]", i),
                    lr,
                    "must be finite and non-negative",
                ));
            }
        }
        for (i, alpha) in self.habituation_alpha.iter().enumerate() {
            if *alpha == 0.0 || !alpha.is_finite() {
                return Err(GasError::invalid_config(
                    &format!("habituation_alpha[{}]", i),
                    alpha,
                    "must be finite and non-zero",
                ));
            }
        }
        for (i, tau) in self.habituation_tau.iter().enumerate() {
            if !(*tau > 0.0) {
                return Err(GasError::invalid_config(
                    &format!("habituation_tau[{}]", i),
                    tau,
                    "must be positive",
                ));
            }
        }
        if self.habituation_threshold.is_nan() {
            return Err(GasError::invalid_config(
                "habituation_threshold",
                self.habituation_threshold,
                "must be a number",
            ));
        }
        if self.batch_size == 0 {
            return Err(GasError::invalid_config("batch_size", 0, "must be at least 1"));
        }
        Ok(())
    }

    pub fn with_insertion_threshold(mut self, threshold: impl Into<ThresholdPolicy>) -> Self {
        self.insertion_threshold = threshold.into();
        self
    }

    pub fn with_trust(mut self, trust: f64) -> Self {
        self.trust = trust;
        self
    }

    pub fn with_learning_rate(mut self, nearest: f64, neighbor: f64) -> Self {
        self.learning_rate = [nearest, neighbor];
        self
    }

    pub fn with_habituation_threshold(mut self, threshold: f64) -> Self {
        self.habituation_threshold = threshold;
        self
    }

    pub fn with_habituation(mut self, habituation: Habituation) -> Self {
        self.habituation_initial = habituation.initial;
        self.habituation_alpha = habituation.alpha;
        self.habituation_tau = habituation.tau;
        self
    }

    pub fn with_edge_lifetime(mut self, lifetime: u64) -> Self {
        self.edge_lifetime = lifetime;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_collapse_below(mut self, threshold: impl Into<ThresholdPolicy>) -> Self {
        self.collapse_below = Some(threshold.into());
        self
    }
}

/// How many out-of-tolerance residuals a batch may contain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorTolerance {
    /// Absolute number of residuals above `residual_max`.
    Count(usize),
    /// Share of the batch, rounded up to a count.
    Fraction(f64),
}

impl Default for ErrorTolerance {
    fn default() -> Self {
        ErrorTolerance::Fraction(1e-6)
    }
}

impl ErrorTolerance {
    /// The tolerance as an absolute count for a batch of `batch_size` points.
    pub fn to_count(self, batch_size: usize) -> usize {
        match self {
            ErrorTolerance::Count(n) => n,
            ErrorTolerance::Fraction(f) => (f * batch_size as f64).ceil().max(0.0) as usize,
        }
    }
}

/// The residual-trend rule applied after all other criteria pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppingCriterion {
    /// Fit a line through the batch residuals. Stop when the slope is not
    /// negative, or when the confidence that residuals still decrease
    /// drops to `tolerance` or below.
    TrendRegression { tolerance: f64 },
    /// Stop once the mean batch residual no longer falls, measured in units
    /// of the batch's own standard deviation.
    MeanComparison,
}

impl Default for StoppingCriterion {
    fn default() -> Self {
        StoppingCriterion::MeanComparison
    }
}

/// Stopping conditions for one training session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// `(min, max)` number of passes over the sample, as multiples of its size.
    pub pass_count: Option<(f64, f64)>,
    /// Residuals above this count as errors.
    pub residual_max: Option<f64>,
    /// Errors a batch may hold before training is forced to continue.
    pub error_count_tol: ErrorTolerance,
    /// Minimum relative node growth per batch.
    pub min_growth: Option<f64>,
    /// Maximum share of nodes removed by one collapse.
    pub collapse_tol: Option<f64>,
    pub stopping_criterion: StoppingCriterion,
    /// Seed for batch sampling; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Hard cap on the number of batches.
    pub max_batches: Option<usize>,
}

impl TrainingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some((min, max)) = self.pass_count {
            if !(min >= 0.0 && max >= min) {
                return Err(GasError::invalid_config(
                    "pass_count",
                    format!("({}, {})", min, max),
                    "need 0 <= min <= max",
                ));
            }
        }
        if let ErrorTolerance::Fraction(f) = self.error_count_tol {
            if !(0.0..=1.0).contains(&f) {
                return Err(GasError::invalid_config("error_count_tol", f, "fraction must be in [0, 1]"));
            }
        }
        if self.max_batches == Some(0) {
            return Err(GasError::invalid_config("max_batches", 0, "must be at least 1"));
        }
        Ok(())
    }

    pub fn with_pass_count(mut self, min: f64, max: f64) -> Self {
        self.pass_count = Some((min, max));
        self
    }

    pub fn with_residual_max(mut self, residual_max: f64, tolerance: ErrorTolerance) -> Self {
        self.residual_max = Some(residual_max);
        self.error_count_tol = tolerance;
        self
    }

    pub fn with_min_growth(mut self, min_growth: f64) -> Self {
        self.min_growth = Some(min_growth);
        self
    }

    pub fn with_collapse_tol(mut self, collapse_tol: f64) -> Self {
        self.collapse_tol = Some(collapse_tol);
        self
    }

    pub fn with_stopping_criterion(mut self, criterion: StoppingCriterion) -> Self {
        self.stopping_criterion = criterion;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_batches(mut self, max_batches: usize) -> Self {
        self.max_batches = Some(max_batches);
        self
    }
}

/// JSON has no infinity; +inf travels as `null`.
mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_none()
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let c = GasConfig::default();
        assert_eq!(c.insertion_threshold.fixed_value(), Some(0.95));
        assert_eq!(c.trust, 0.0);
        assert_eq!(c.learning_rate, [0.2, 0.006]);
        assert!(c.habituation_threshold.is_infinite());
        assert_eq!(c.habituation_initial, 1.0);
        assert_eq!(c.habituation_alpha, [1.05, 1.05]);
        assert_eq!(c.habituation_tau, [3.33, 14.33]);
        assert_eq!(c.edge_lifetime, 50);
        assert_eq!(c.batch_size, 1000);
        assert!(c.collapse_below.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c = GasConfig::from_json(r#"{"trust": 0.5, "collapse_below": 0.1}"#).unwrap();
        assert_eq!(c.trust, 0.5);
        assert_eq!(c.edge_lifetime, 50);
        assert_eq!(c.collapse_below.and_then(|p| p.fixed_value()), Some(0.1));
    }

    #[test]
    fn infinite_threshold_round_trips() {
        let json = GasConfig::default().to_json().unwrap();
        assert!(json.contains(r#""habituation_threshold": null"#));
        let back = GasConfig::from_json(&json).unwrap();
        assert!(back.habituation_threshold.is_infinite());
    }

    #[test]
    fn rejects_out_of_range_trust() {
        let err = GasConfig::default().with_trust(1.5).validate().unwrap_err();
        assert!(matches!(err, GasError::InvalidInput(_)));
        assert!(GasConfig::from_json(r#"{"batch_size": 0}"#).is_err());
    }

    #[test]
    fn error_tolerance_to_count() {
        assert_eq!(ErrorTolerance::Count(7).to_count(1000), 7);
        assert_eq!(ErrorTolerance::Fraction(0.05).to_count(1000), 50);
        assert_eq!(ErrorTolerance::Fraction(0.001).to_count(10), 1);
        assert_eq!(ErrorTolerance::default().to_count(1000), 1);
    }

    #[test]
    fn training_config_from_json() {
        let c = TrainingConfig::from_json(
            r#"{"pass_count": [1.0, 3.0], "stopping_criterion": {"trend_regression": {"tolerance": 0.5}}}"#,
        )
        .unwrap();
        assert_eq!(c.pass_count, Some((1.0, 3.0)));
        assert_eq!(
            c.stopping_criterion,
            StoppingCriterion::TrendRegression { tolerance: 0.5 }
        );
        assert!(TrainingConfig::from_json(r#"{"pass_count": [3.0, 1.0]}"#).is_err());
    }
}
