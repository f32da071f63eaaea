//! Least-squares Gaussian fitting for Pta.
//!
//! Fits the 3-parameter model
//!
//! ```text
//! f(x) = height * exp(-(x - mean)^2 / (2 * sigma^2))
//! ```
//!
//! to the points of a [`Pta`] with Levenberg-Marquardt. All arithmetic is
//! `f64`. Observations are unweighted.

use crate::error::{Error, Result};
use crate::pta::Pta;

/// `2 * sqrt(2 * ln 2)`: ratio of full width at half maximum to sigma.
const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949_3;

/// Residual sum of squares treated as an exact fit.
const EXACT_FIT_CHI2: f64 = 1e-24;

/// Damping above which the optimizer gives up.
const MAX_LAMBDA: f64 = 1e12;

/// Configuration for Levenberg-Marquardt optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct LmConfig {
    /// Maximum iterations.
    pub max_iterations: usize,
    /// Relative tolerance on parameter steps and on chi-square reduction.
    pub tolerance: f64,
    /// Initial damping parameter.
    pub initial_lambda: f64,
    /// Factor to increase lambda on a rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on an accepted step.
    pub lambda_down: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
        }
    }
}

/// Parameters of a 1D Gaussian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianParams {
    /// Peak height
    pub height: f64,
    /// Center
    pub mean: f64,
    /// Standard deviation
    pub sigma: f64,
}

impl GaussianParams {
    fn to_array(self) -> [f64; 3] {
        [self.height, self.mean, self.sigma]
    }

    fn from_array([height, mean, sigma]: [f64; 3]) -> Self {
        Self {
            height,
            mean,
            sigma,
        }
    }

    /// True when every parameter is finite.
    pub fn is_finite(&self) -> bool {
        self.height.is_finite() && self.mean.is_finite() && self.sigma.is_finite()
    }
}

/// Outcome of a Gaussian least-squares fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianLsf {
    /// Fitted parameters; `sigma` is reported as its absolute value
    pub params: GaussianParams,
    /// Residual sum of squares at `params`
    pub rss: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether a convergence criterion was met
    pub converged: bool,
}

impl Pta {
    /// Estimate starting parameters for a Gaussian fit.
    ///
    /// Height is the largest y value and mean its x coordinate (first one
    /// on ties). Sigma comes from the full width at half maximum, found by
    /// linear interpolation of the half-height crossing on each side of
    /// the peak; a side with no crossing uses the outermost point. Points
    /// are expected in increasing x order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NullInput`] for an empty Pta.
    pub fn guess_gaussian(&self) -> Result<GaussianParams> {
        let imax = self.argmax_y().ok_or(Error::NullInput("empty Pta"))?;
        let xa = self.x_coords();
        let ya = self.y_coords();
        let height = ya[imax];
        let mean = xa[imax];
        let half = 0.5 * height;

        let left = half_height_crossing(xa, ya, imax, half, Direction::Left);
        let right = half_height_crossing(xa, ya, imax, half, Direction::Right);
        let mut sigma = (right - left) / FWHM_PER_SIGMA;
        if !(sigma > 0.0 && sigma.is_finite()) {
            sigma = 1.0;
        }

        Ok(GaussianParams {
            height,
            mean,
            sigma,
        })
    }

    /// Levenberg-Marquardt Gaussian fit starting from `initial`.
    ///
    /// A step is accepted only when it lowers the residual sum of squares.
    /// Convergence is declared when an accepted step changes every
    /// parameter by less than `tolerance` relative to its magnitude, when
    /// it lowers the residual by less than `tolerance` relative to its
    /// value, or when the residual is already zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] with fewer than 3 points and
    /// [`Error::FitFailed`] when the residual at `initial` is not finite.
    pub fn get_gaussian_lsf(&self, initial: GaussianParams, config: &LmConfig) -> Result<GaussianLsf> {
        let n = self.len();
        if n < 3 {
            return Err(Error::InvalidParameter(format!(
                "less than 3 pts found ({n})"
            )));
        }
        let xa = self.x_coords();
        let ya = self.y_coords();

        let mut params = initial.to_array();
        let mut lambda = config.initial_lambda;
        let mut chi2 = compute_chi2(xa, ya, &params);
        if !chi2.is_finite() {
            return Err(Error::FitFailed(format!(
                "non-finite residual at start {initial:?}"
            )));
        }
        let mut converged = chi2 <= EXACT_FIT_CHI2;
        let mut iterations = 0;

        while !converged && iterations < config.max_iterations {
            iterations += 1;

            let (hessian, gradient) = hessian_gradient(xa, ya, &params);
            if gradient.iter().all(|g| g.abs() <= f64::MIN_POSITIVE) {
                converged = true;
                break;
            }

            let mut damped = hessian;
            for (i, row) in damped.iter_mut().enumerate() {
                row[i] *= 1.0 + lambda;
            }

            let Some(delta) = solve_3x3(&damped, &gradient) else {
                lambda *= config.lambda_up;
                if lambda > MAX_LAMBDA {
                    break;
                }
                continue;
            };

            let mut trial = params;
            for (p, d) in trial.iter_mut().zip(delta.iter()) {
                *p += d;
            }
            let trial_chi2 = compute_chi2(xa, ya, &trial);
            let small_step = delta
                .iter()
                .zip(trial.iter())
                .all(|(d, p)| d.abs() <= config.tolerance * (p.abs() + config.tolerance));

            if trial_chi2.is_finite() && trial_chi2 < chi2 {
                let small_gain = chi2 - trial_chi2 <= config.tolerance * chi2;

                params = trial;
                chi2 = trial_chi2;
                lambda *= config.lambda_down;
                log::trace!(
                    "lm iter {iterations}: chi2={chi2:.6e} lambda={lambda:.3e} params={params:?}"
                );

                if small_step || small_gain || chi2 <= EXACT_FIT_CHI2 {
                    converged = true;
                }
            } else if small_step {
                // Rounding floor: no representable step improves the fit
                converged = true;
            } else {
                lambda *= config.lambda_up;
                if lambda > MAX_LAMBDA {
                    break;
                }
            }
        }

        params[2] = params[2].abs();
        Ok(GaussianLsf {
            params: GaussianParams::from_array(params),
            rss: chi2,
            iterations,
            converged,
        })
    }
}

/// Evaluate the Gaussian `params` at x.
pub fn apply_gaussian_fit(params: &GaussianParams, x: f64) -> f64 {
    evaluate(x, &params.to_array())
}

#[derive(Clone, Copy)]
enum Direction {
    Left,
    Right,
}

/// x where the curve falls through `half`, walking away from `start`.
fn half_height_crossing(xa: &[f64], ya: &[f64], start: usize, half: f64, dir: Direction) -> f64 {
    let mut i = start;
    loop {
        let next = match dir {
            Direction::Left if i > 0 => i - 1,
            Direction::Right if i + 1 < xa.len() => i + 1,
            _ => return xa[i],
        };
        if ya[next] <= half {
            let dy = ya[i] - ya[next];
            if dy == 0.0 {
                return xa[next];
            }
            let t = (ya[i] - half) / dy;
            return xa[i] + t * (xa[next] - xa[i]);
        }
        i = next;
    }
}

#[inline]
fn evaluate(x: f64, params: &[f64; 3]) -> f64 {
    let [height, mean, sigma] = *params;
    let dx = x - mean;
    height * (-0.5 * dx * dx / (sigma * sigma)).exp()
}

#[inline]
fn jacobian_row(x: f64, params: &[f64; 3]) -> [f64; 3] {
    let [height, mean, sigma] = *params;
    let sigma2 = sigma * sigma;
    let dx = x - mean;
    let e = (-0.5 * dx * dx / sigma2).exp();
    let he = height * e;
    [
        e,                             // df/dheight
        he * dx / sigma2,              // df/dmean
        he * dx * dx / (sigma2 * sigma), // df/dsigma
    ]
}

fn compute_chi2(xa: &[f64], ya: &[f64], params: &[f64; 3]) -> f64 {
    xa.iter()
        .zip(ya.iter())
        .map(|(&x, &y)| {
            let r = y - evaluate(x, params);
            r * r
        })
        .sum()
}

/// J^T J and J^T r for the current parameters.
#[allow(clippy::needless_range_loop)]
fn hessian_gradient(xa: &[f64], ya: &[f64], params: &[f64; 3]) -> ([[f64; 3]; 3], [f64; 3]) {
    let mut hessian = [[0.0f64; 3]; 3];
    let mut gradient = [0.0f64; 3];

    for (&x, &y) in xa.iter().zip(ya.iter()) {
        let row = jacobian_row(x, params);
        let r = y - evaluate(x, params);
        for i in 0..3 {
            gradient[i] += row[i] * r;
            for j in i..3 {
                hessian[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 1..3 {
        for j in 0..i {
            hessian[i][j] = hessian[j][i];
        }
    }

    (hessian, gradient)
}

/// Gauss-Jordan elimination with partial pivoting for a 3x3 system.
/// Returns None if singular.
fn solve_3x3(a: &[[f64; 3]; 3], b: &[f64; 3]) -> Option<[f64; 3]> {
    // Augmented matrix [A | b]
    let mut m = [[0.0f64; 4]; 3];
    for (row, (src, &rhs)) in m.iter_mut().zip(a.iter().zip(b.iter())) {
        row[..3].copy_from_slice(src);
        row[3] = rhs;
    }

    let scale = a
        .iter()
        .flat_map(|r| r.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }

    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| {
            m[i][col]
                .abs()
                .partial_cmp(&m[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        m.swap(col, pivot);

        let diag = m[col][col];
        if diag.abs() <= 1e-14 * scale {
            return None;
        }
        for v in &mut m[col] {
            *v /= diag;
        }
        let pivot_row = m[col];
        for (row, m_row) in m.iter_mut().enumerate() {
            if row == col {
                continue;
            }
            let factor = m_row[col];
            for (rv, &pv) in m_row.iter_mut().zip(pivot_row.iter()) {
                *rv -= pv * factor;
            }
        }
    }

    let x = [m[0][3], m[1][3], m[2][3]];
    x.iter().all(|v| v.is_finite()).then_some(x)
}
