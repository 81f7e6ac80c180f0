//! Generalized extreme value fitting and return levels
//!
//! The shape parameter follows the `c` convention of scipy's `genextreme`
//! (`c > 0` is a bounded upper tail, `c = 0` is Gumbel), so
//! `F(x) = exp(-(1 - c z)^(1/c))` with `z = (x - loc) / scale`.

use crate::errors::{CmipVisError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Minimum number of finite values for a fit
pub const MIN_SAMPLES: usize = 5;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
const SHAPE_EPS: f64 = 1e-8;
const START_SHAPES: [f64; 3] = [-0.2, 0.0, 0.2];

/// Fitted GEV parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GevParams {
    pub shape: f64,
    pub loc: f64,
    pub scale: f64,
}

impl GevParams {
    /// Inverse CDF at probability `p` (0 < p < 1)
    pub fn ppf(&self, p: f64) -> f64 {
        let y = -p.ln();
        if self.shape.abs() < SHAPE_EPS {
            self.loc - self.scale * y.ln()
        } else {
            self.loc + self.scale * (1.0 - y.powf(self.shape)) / self.shape
        }
    }

    /// Level exceeded on average once every `period` years
    pub fn return_level(&self, period: u32) -> f64 {
        self.ppf(1.0 - 1.0 / f64::from(period))
    }

    /// Negative log-likelihood of `data`, infinite outside the support
    pub fn neg_log_likelihood(&self, data: &[f64]) -> f64 {
        if !(self.scale > 0.0) {
            return f64::INFINITY;
        }
        let log_scale = self.scale.ln();
        let mut total = 0.0;
        for &x in data {
            let z = (x - self.loc) / self.scale;
            let term = if self.shape.abs() < SHAPE_EPS {
                z + (-z).exp()
            } else {
                let t = 1.0 - self.shape * z;
                if t <= 0.0 {
                    return f64::INFINITY;
                }
                let log_t = t.ln();
                // -(1/c - 1) ln t + t^(1/c)
                -(1.0 / self.shape - 1.0) * log_t + (log_t / self.shape).exp()
            };
            total += log_scale + term;
        }
        if total.is_finite() {
            total
        } else {
            f64::INFINITY
        }
    }
}

/// Return levels keyed by period in years
pub type ReturnLevels = BTreeMap<u32, f64>;

/// Maximum likelihood GEV fit of the finite values in `data`.
pub fn fit_gev(data: &[f64]) -> Result<GevParams> {
    let values: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if values.len() < MIN_SAMPLES {
        return Err(CmipVisError::SeriesTooShort {
            found: values.len(),
            required: MIN_SAMPLES,
        });
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    if !(std_dev > f64::EPSILON * mean.abs().max(1.0)) {
        return Err(CmipVisError::FitFailed("sample has no spread".to_string()));
    }

    // Gumbel moment estimates as the starting point
    let scale0 = std_dev * 6f64.sqrt() / std::f64::consts::PI;
    let loc0 = mean - EULER_GAMMA * scale0;

    let objective = |p: &[f64; 3]| {
        GevParams {
            shape: p[0],
            loc: p[1],
            scale: p[2].exp(),
        }
        .neg_log_likelihood(&values)
    };

    let mut best: Option<([f64; 3], f64)> = None;
    for shape0 in START_SHAPES {
        let start = [shape0, loc0, scale0.ln()];
        if !objective(&start).is_finite() {
            continue;
        }
        let steps = [0.1, 0.1 * scale0.max(1e-3), 0.1];
        if let Some((point, value)) = nelder_mead(&objective, start, steps) {
            debug!(shape0, nll = value, "GEV fit converged");
            if best.map_or(true, |(_, b)| value < b) {
                best = Some((point, value));
            }
        }
    }

    let (point, _) = best.ok_or_else(|| {
        CmipVisError::FitFailed("likelihood optimization did not converge".to_string())
    })?;
    let params = GevParams {
        shape: point[0],
        loc: point[1],
        scale: point[2].exp(),
    };
    if !(params.shape.is_finite() && params.loc.is_finite() && params.scale.is_finite()) {
        return Err(CmipVisError::FitFailed(format!(
            "non-finite parameters {params:?}"
        )));
    }
    Ok(params)
}

/// Fits a GEV to `data` and evaluates the level for each period.
pub fn compute_return_levels(data: &[f64], periods: &[u32]) -> Result<ReturnLevels> {
    if let Some(&bad) = periods.iter().find(|&&p| p <= 1) {
        return Err(CmipVisError::InvalidReturnPeriod(bad));
    }
    let params = fit_gev(data)?;
    debug!(?params, "Fitted GEV");
    Ok(periods
        .iter()
        .map(|&p| (p, params.return_level(p)))
        .collect())
}

const MAX_ITERATIONS: usize = 5_000;
const X_TOLERANCE: f64 = 1e-7;
const F_TOLERANCE: f64 = 1e-9;

/// Nelder-Mead simplex minimization in three dimensions.
///
/// Returns `None` when the iteration budget runs out before the simplex
/// shrinks below tolerance, or when the best value is not finite.
fn nelder_mead(
    f: &impl Fn(&[f64; 3]) -> f64,
    start: [f64; 3],
    steps: [f64; 3],
) -> Option<([f64; 3], f64)> {
    const ALPHA: f64 = 1.0;
    const GAMMA: f64 = 2.0;
    const RHO: f64 = 0.5;
    const SIGMA: f64 = 0.5;

    let mut simplex: Vec<([f64; 3], f64)> = Vec::with_capacity(4);
    simplex.push((start, f(&start)));
    for axis in 0..3 {
        let mut vertex = start;
        vertex[axis] += steps[axis];
        simplex.push((vertex, f(&vertex)));
    }

    for _ in 0..MAX_ITERATIONS {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let (best, best_value) = simplex[0];
        let worst_value = simplex[3].1;
        let spread = simplex[1..]
            .iter()
            .flat_map(|(v, _)| v.iter().zip(&best).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        if best_value.is_finite()
            && spread < X_TOLERANCE.max(X_TOLERANCE * best.iter().fold(0.0_f64, |m, v| m.max(v.abs())))
            && (worst_value - best_value).abs() < F_TOLERANCE.max(F_TOLERANCE * best_value.abs())
        {
            return Some((best, best_value));
        }

        let mut centroid = [0.0; 3];
        for (vertex, _) in &simplex[..3] {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v / 3.0;
            }
        }
        let towards = |coef: f64, from: &[f64; 3]| -> [f64; 3] {
            let mut p = [0.0; 3];
            for i in 0..3 {
                p[i] = centroid[i] + coef * (from[i] - centroid[i]);
            }
            p
        };

        let worst = simplex[3].0;
        let reflected = towards(-ALPHA, &worst);
        let reflected_value = f(&reflected);

        if reflected_value < simplex[0].1 {
            let expanded = towards(-ALPHA * GAMMA, &worst);
            let expanded_value = f(&expanded);
            simplex[3] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }
        if reflected_value < simplex[2].1 {
            simplex[3] = (reflected, reflected_value);
            continue;
        }

        let contracted = if reflected_value < worst_value {
            towards(-RHO, &worst)
        } else {
            towards(RHO, &worst)
        };
        let contracted_value = f(&contracted);
        if contracted_value < worst_value.min(reflected_value) {
            simplex[3] = (contracted, contracted_value);
            continue;
        }

        for entry in simplex.iter_mut().skip(1) {
            let mut vertex = [0.0; 3];
            for i in 0..3 {
                vertex[i] = best[i] + SIGMA * (entry.0[i] - best[i]);
            }
            *entry = (vertex, f(&vertex));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nelder_mead_finds_quadratic_minimum() {
        let f = |p: &[f64; 3]| (p[0] - 1.0).powi(2) + (p[1] + 2.0).powi(2) + (p[2] - 0.5).powi(2);
        let (point, value) = nelder_mead(&f, [0.0, 0.0, 0.0], [0.5, 0.5, 0.5]).unwrap();
        assert!((point[0] - 1.0).abs() < 1e-4);
        assert!((point[1] + 2.0).abs() < 1e-4);
        assert!((point[2] - 0.5).abs() < 1e-4);
        assert!(value < 1e-8);
    }

    #[test]
    fn gumbel_ppf_matches_closed_form() {
        let params = GevParams {
            shape: 0.0,
            loc: 10.0,
            scale: 2.0,
        };
        let expected = 10.0 - 2.0 * (-(0.9f64).ln()).ln();
        assert!((params.return_level(10) - expected).abs() < 1e-12);
    }
}
