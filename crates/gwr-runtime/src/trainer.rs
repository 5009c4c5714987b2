//! Trainer: the outer loop around [`Gas::batch_train`].
//!
//! Each iteration:
//! 1. Draw `batch_size` points from the sample, uniformly with replacement
//! 2. Run them through the gas and record the residuals
//! 3. Collapse close neighbors, if a collapse threshold is configured
//! 4. Walk the stopping conditions in order; the first one that decides
//!    (stop or keep going) ends the walk
//!
//! All randomness comes from one seedable RNG, so a seeded run replays
//! exactly.

use crate::config::{StoppingCriterion, TrainingConfig};
use crate::gas::{check_rows, Gas};
use crate::stats;
use gwr_core::error::{GasError, Result};
use gwr_core::graph::GasGraph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Summary of one training batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// 1-based batch number.
    pub batch: usize,
    /// Points processed so far, this batch included.
    pub points_processed: usize,
    pub nodes_before: usize,
    /// Node count after the batch, before collapsing.
    pub nodes_after: usize,
    /// Nodes removed by collapsing after the batch.
    pub collapsed: usize,
    pub edges: usize,
    pub mean_residual: f64,
    pub residual_std: f64,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Relative node growth over the batch.
    pub fn growth(&self) -> Option<f64> {
        (self.nodes_before > 0)
            .then(|| (self.nodes_after as f64 - self.nodes_before as f64) / self.nodes_before as f64)
    }

    /// Share of nodes removed by collapsing.
    pub fn collapse_ratio(&self) -> Option<f64> {
        (self.nodes_after > 0).then(|| self.collapsed as f64 / self.nodes_after as f64)
    }
}

/// Why training stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The upper pass-count bound was reached.
    PassCountMax,
    /// Node growth fell below `min_growth`.
    GrowthBelowMin { growth: f64 },
    /// Collapsing removed more than `collapse_tol` of the nodes.
    CollapseAboveTol { ratio: f64 },
    /// The residual trend is no longer decreasing.
    TrendNotDecreasing { slope: f64, confidence: f64 },
    /// The mean residual stopped falling.
    MeanNotDecreasing { mean: f64, previous: f64 },
    /// `max_batches` was reached.
    MaxBatches,
    /// The caller's stop check asked to stop.
    Requested,
}

/// Result of a training session.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingOutcome {
    /// Every residual, in processing order across all batches.
    pub residuals: Vec<f64>,
    pub batches: Vec<BatchReport>,
    pub stop_reason: StopReason,
}

/// Per-session state of the residual-trend rule.
enum TrendState {
    Regression { tolerance: f64 },
    Mean { previous: f64 },
}

impl TrendState {
    fn new(criterion: StoppingCriterion) -> Self {
        match criterion {
            StoppingCriterion::TrendRegression { tolerance } => TrendState::Regression { tolerance },
            StoppingCriterion::MeanComparison => TrendState::Mean {
                previous: f64::INFINITY,
            },
        }
    }

    /// Feed one batch of residuals; `Some` when training should stop.
    fn update(&mut self, residuals: &[f64], report: &BatchReport) -> Result<Option<StopReason>> {
        match self {
            TrendState::Regression { tolerance } => {
                // fewer than three residuals leave no evidence of a decrease
                let Some(trend) = stats::linear_trend(residuals)? else {
                    return Ok(Some(StopReason::TrendNotDecreasing {
                        slope: 0.0,
                        confidence: 0.0,
                    }));
                };
                if trend.slope >= 0.0 {
                    return Ok(Some(StopReason::TrendNotDecreasing {
                        slope: trend.slope,
                        confidence: 0.0,
                    }));
                }
                let confidence = stats::decrease_confidence(trend.p_decreasing);
                Ok((confidence <= *tolerance).then_some(StopReason::TrendNotDecreasing {
                    slope: trend.slope,
                    confidence,
                }))
            }
            TrendState::Mean { previous } => {
                let prev = *previous;
                *previous = report.mean_residual;
                // a constant batch gives no evidence either way
                if report.residual_std == 0.0 {
                    return Ok(None);
                }
                let change = (report.mean_residual - prev) / report.residual_std;
                Ok((change >= 0.0).then_some(StopReason::MeanNotDecreasing {
                    mean: report.mean_residual,
                    previous: prev,
                }))
            }
        }
    }
}

type StopCheck<'g> = Box<dyn FnMut(&BatchReport) -> bool + 'g>;

/// Runs a training session over a borrowed gas.
pub struct Trainer<'g, G: GasGraph> {
    gas: &'g mut Gas<G>,
    config: TrainingConfig,
    stop_check: Option<StopCheck<'g>>,
}

impl<'g, G: GasGraph> Trainer<'g, G> {
    pub fn new(gas: &'g mut Gas<G>, config: TrainingConfig) -> Self {
        Self {
            gas,
            config,
            stop_check: None,
        }
    }

    /// Ask `check` after every batch whether to stop early.
    pub fn with_stop_check<F>(mut self, check: F) -> Self
    where
        F: FnMut(&BatchReport) -> bool + 'g,
    {
        self.stop_check = Some(Box::new(check));
        self
    }

    /// Train until a stopping condition fires.
    pub fn train<R: AsRef<[f64]>>(mut self, sample: &[R]) -> Result<TrainingOutcome> {
        self.config.validate()?;
        if sample.is_empty() {
            return Err(GasError::invalid_input("training sample is empty"));
        }
        check_rows(sample, Some(self.gas.dim()))?;

        let n = sample.len();
        let batch_size = self.gas.config().batch_size;
        let error_tol = self.config.error_count_tol.to_count(batch_size);
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut trend = TrendState::new(self.config.stopping_criterion);

        let mut residuals = Vec::new();
        let mut batches: Vec<BatchReport> = Vec::new();

        let stop_reason = loop {
            let started = Instant::now();
            let batch: Vec<&[f64]> = (0..batch_size)
                .map(|_| sample[rng.gen_range(0..n)].as_ref())
                .collect();

            let nodes_before = self.gas.graph().node_count();
            let r = self.gas.batch_train(&batch)?;
            let nodes_after = self.gas.graph().node_count();
            let collapsed = self.gas.collapse()?.removed();

            let report = BatchReport {
                batch: batches.len() + 1,
                points_processed: (batches.len() + 1) * batch_size,
                nodes_before,
                nodes_after,
                collapsed,
                edges: self.gas.graph().edge_count(),
                mean_residual: stats::mean(&r),
                residual_std: stats::std_dev(&r),
                elapsed: started.elapsed(),
            };
            if collapsed > 0 {
                info!(
                    "batch {}: {} nodes (-{}), mean residual {:.4}, {:.0} ms",
                    report.batch,
                    nodes_after,
                    collapsed,
                    report.mean_residual,
                    report.elapsed.as_secs_f64() * 1e3
                );
            } else {
                info!(
                    "batch {}: {} nodes, mean residual {:.4}, {:.0} ms",
                    report.batch,
                    nodes_after,
                    report.mean_residual,
                    report.elapsed.as_secs_f64() * 1e3
                );
            }

            residuals.extend_from_slice(&r);
            let decision = self.evaluate(&report, &r, n, error_tol, &mut trend)?;
            batches.push(report);
            if let Some(reason) = decision {
                break reason;
            }
        };

        log_summary(&batches, &stop_reason);
        Ok(TrainingOutcome {
            residuals,
            batches,
            stop_reason,
        })
    }

    /// Walk the stopping conditions for one batch.
    fn evaluate(
        &mut self,
        report: &BatchReport,
        residuals: &[f64],
        sample_size: usize,
        error_tol: usize,
        trend: &mut TrendState,
    ) -> Result<Option<StopReason>> {
        if let Some(check) = self.stop_check.as_mut() {
            if check(report) {
                return Ok(Some(StopReason::Requested));
            }
        }
        if self.config.max_batches.is_some_and(|max| report.batch >= max) {
            return Ok(Some(StopReason::MaxBatches));
        }

        if let Some((min, max)) = self.config.pass_count {
            let processed = report.points_processed as f64;
            if processed < min * sample_size as f64 {
                return Ok(None);
            }
            if max * sample_size as f64 <= processed {
                info!("upper bound for pass_count reached");
                return Ok(Some(StopReason::PassCountMax));
            }
        }

        if let Some(residual_max) = self.config.residual_max {
            let errors = residuals.iter().filter(|&&r| r > residual_max).count();
            if errors > error_tol {
                return Ok(None);
            }
        }

        if let (Some(min_growth), Some(growth)) = (self.config.min_growth, report.growth()) {
            if growth < min_growth {
                info!("relative growth: {:.0}%", growth * 100.0);
                return Ok(Some(StopReason::GrowthBelowMin { growth }));
            }
        }

        if self.gas.config().collapse_below.is_some() {
            if let (Some(tol), Some(ratio)) = (self.config.collapse_tol, report.collapse_ratio()) {
                if ratio > tol {
                    info!("relative collapse: {:.0}%", ratio * 100.0);
                    return Ok(Some(StopReason::CollapseAboveTol { ratio }));
                }
            }
        }

        trend.update(residuals, report)
    }
}

fn log_summary(batches: &[BatchReport], reason: &StopReason) {
    let times: Vec<f64> = batches
        .iter()
        .map(|b| b.elapsed.as_secs_f64() * 1e3)
        .collect();
    info!(
        "training stopped after {} batch(es) ({:?}); batch time mean: {:.0} ms, std: {:.0} ms",
        batches.len(),
        reason,
        stats::mean(&times),
        stats::std_dev(&times)
    );
}

impl<G: GasGraph> Gas<G> {
    /// Train on `sample` until a stopping condition in `config` fires.
    pub fn train<R: AsRef<[f64]>>(&mut self, sample: &[R], config: TrainingConfig) -> Result<TrainingOutcome> {
        Trainer::new(self, config).train(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(mean: f64, std: f64) -> BatchReport {
        BatchReport {
            batch: 1,
            points_processed: 10,
            nodes_before: 10,
            nodes_after: 12,
            collapsed: 3,
            edges: 20,
            mean_residual: mean,
            residual_std: std,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn report_ratios() {
        let r = report(1.0, 1.0);
        assert!((r.growth().unwrap() - 0.2).abs() < 1e-12);
        assert!((r.collapse_ratio().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn mean_comparison_continues_while_falling() {
        let mut state = TrendState::new(StoppingCriterion::MeanComparison);
        assert_eq!(state.update(&[], &report(2.0, 1.0)).unwrap(), None);
        assert_eq!(state.update(&[], &report(1.5, 1.0)).unwrap(), None);
        assert_eq!(
            state.update(&[], &report(1.7, 1.0)).unwrap(),
            Some(StopReason::MeanNotDecreasing {
                mean: 1.7,
                previous: 1.5
            })
        );
    }

    #[test]
    fn mean_comparison_ignores_zero_std() {
        let mut state = TrendState::new(StoppingCriterion::MeanComparison);
        state.update(&[], &report(1.0, 1.0)).unwrap();
        assert_eq!(state.update(&[], &report(3.0, 0.0)).unwrap(), None);
    }

    #[test]
    fn regression_stops_on_rising_residuals() {
        let mut state = TrendState::new(StoppingCriterion::TrendRegression { tolerance: 0.5 });
        let rising: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        assert!(matches!(
            state.update(&rising, &report(1.0, 1.0)).unwrap(),
            Some(StopReason::TrendNotDecreasing { .. })
        ));
    }

    #[test]
    fn regression_continues_on_clear_decrease() {
        let mut state = TrendState::new(StoppingCriterion::TrendRegression { tolerance: 0.5 });
        let falling: Vec<f64> = (0..20)
            .map(|i| 5.0 - i as f64 * 0.2 + if i % 2 == 0 { 0.05 } else { -0.05 })
            .collect();
        assert_eq!(state.update(&falling, &report(1.0, 1.0)).unwrap(), None);
    }

    #[test]
    fn regression_stops_on_too_short_batch() {
        let mut state = TrendState::new(StoppingCriterion::TrendRegression { tolerance: 0.5 });
        assert_eq!(
            state.update(&[2.0, 1.0], &report(1.5, 0.5)).unwrap(),
            Some(StopReason::TrendNotDecreasing {
                slope: 0.0,
                confidence: 0.0
            })
        );
    }
}
