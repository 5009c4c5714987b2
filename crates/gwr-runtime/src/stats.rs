//! Residual statistics used by the stopping criteria.

use gwr_core::error::{GasError, Result};
use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Ordinary least-squares fit of a series against evenly spaced time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub intercept: f64,
    pub slope: f64,
    /// Standard error of the slope.
    pub slope_se: f64,
    /// One-sided p-value for "the slope is negative".
    pub p_decreasing: f64,
}

/// Regress `values` on `linspace(0, 1, len)`.
///
/// Needs at least three points to leave a residual degree of freedom;
/// returns `Ok(None)` otherwise.
pub fn linear_trend(values: &[f64]) -> Result<Option<Trend>> {
    let n = values.len();
    if n < 3 {
        return Ok(None);
    }
    let step = 1.0 / (n - 1) as f64;
    let xs: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(values);

    let sxx: f64 = xs.iter().map(|x| (x - x_mean) * (x - x_mean)).sum();
    let sxy: f64 = xs
        .iter()
        .zip(values)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let sse: f64 = xs
        .iter()
        .zip(values)
        .map(|(x, y)| {
            let r = y - (intercept + slope * x);
            r * r
        })
        .sum();
    let df = (n - 2) as f64;
    let slope_se = (sse / df / sxx).sqrt();

    let p_decreasing = if slope_se == 0.0 {
        if slope < 0.0 {
            0.0
        } else {
            1.0
        }
    } else {
        let t = StudentsT::new(0.0, 1.0, df).map_err(|e| GasError::invalid_input(e.to_string()))?;
        t.cdf(slope / slope_se)
    };

    Ok(Some(Trend {
        intercept,
        slope,
        slope_se,
        p_decreasing,
    }))
}

/// Confidence that residuals are still decreasing, from the p-value of a
/// negative slope. Close to 1 below p = 0.1 and close to 0 above it.
pub fn decrease_confidence(p_decreasing: f64) -> f64 {
    1.0 / (1.0 + ((p_decreasing - 0.1) / 0.01).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), 5.0);
        assert_eq!(std_dev(&v), 2.0);
        assert_eq!(std_dev(&[3.0, 3.0]), 0.0);
    }

    #[test]
    fn exact_line_is_recovered() {
        let v: Vec<f64> = (0..11).map(|i| 3.0 - 2.0 * (i as f64 / 10.0)).collect();
        let trend = linear_trend(&v).unwrap().unwrap();
        assert!((trend.slope + 2.0).abs() < 1e-9);
        assert!((trend.intercept - 3.0).abs() < 1e-9);
        assert!(trend.p_decreasing < 1e-6);
    }

    #[test]
    fn noisy_decrease_is_significant() {
        let v: Vec<f64> = (0..50)
            .map(|i| 10.0 - 0.1 * i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let trend = linear_trend(&v).unwrap().unwrap();
        assert!(trend.slope < 0.0);
        assert!(trend.p_decreasing < 0.01);
        assert!(decrease_confidence(trend.p_decreasing) > 0.99);
    }

    #[test]
    fn flat_series_is_not_decreasing() {
        let v = [1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0];
        let trend = linear_trend(&v).unwrap().unwrap();
        assert!(trend.p_decreasing > 0.1);
        assert!(decrease_confidence(trend.p_decreasing) < 0.5);
    }

    #[test]
    fn too_short_for_a_trend() {
        assert_eq!(linear_trend(&[1.0, 0.5]).unwrap(), None);
    }
}
