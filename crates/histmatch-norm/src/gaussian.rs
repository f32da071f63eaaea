//! Gaussian fit of the histogram mode
//!
//! Fits `height * exp(-(x - mean)^2 / (2 sigma^2))` to the `(bin index,
//! count)` observations of a [`ModeWindow`]. The heavy lifting is done by
//! the Levenberg-Marquardt routine on [`Pta`]; this module chooses the
//! starting point and validates the outcome.

use crate::histogram::Histogram;
use crate::window::ModeWindow;
use crate::{NormError, NormResult};
use histmatch_core::{GaussianParams, LmConfig, Pta, apply_gaussian_fit};

/// Minimum number of observations for a 3-parameter fit
pub const MIN_FIT_POINTS: usize = 3;

/// Options for the Gaussian fit
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Levenberg-Marquardt settings
    pub lm: LmConfig,
    /// Minimum window size; values below [`MIN_FIT_POINTS`] are raised to it
    pub min_points: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            lm: LmConfig::default(),
            min_points: MIN_FIT_POINTS,
        }
    }
}

/// Fitted Gaussian in bin-index units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFit {
    /// Peak height (counts)
    pub height: f64,
    /// Center (bin-index position)
    pub mean: f64,
    /// Standard deviation (bins), always > 0
    pub sigma: f64,
    /// Residual sum of squares
    pub rss: f64,
    /// Solver iterations
    pub iterations: usize,
}

impl GaussianFit {
    /// Fit the observations selected by `window`
    ///
    /// # Errors
    ///
    /// - `InsufficientData` if the window holds fewer than the minimum
    ///   number of bins
    /// - `NonConvergentFit` if the solver does not converge or produces a
    ///   non-finite or zero sigma
    pub fn fit(hist: &Histogram, window: &ModeWindow, options: &FitOptions) -> NormResult<GaussianFit> {
        Self::fit_points(&window.observations(hist), options)
    }

    /// Fit arbitrary `(x, y)` observations given in increasing x order
    pub fn fit_points(points: &Pta, options: &FitOptions) -> NormResult<GaussianFit> {
        let required = options.min_points.max(MIN_FIT_POINTS);
        if points.len() < required {
            return Err(NormError::InsufficientData {
                points: points.len(),
                required,
            });
        }

        let initial = points.guess_gaussian()?;
        let lsf = points.get_gaussian_lsf(initial, &options.lm)?;

        if !lsf.converged {
            return Err(NormError::NonConvergentFit(format!(
                "no convergence after {} iterations (start {:?})",
                lsf.iterations, initial
            )));
        }
        let GaussianParams {
            height,
            mean,
            sigma,
        } = lsf.params;
        if !lsf.params.is_finite() {
            return Err(NormError::NonConvergentFit(format!(
                "non-finite parameters {:?}",
                lsf.params
            )));
        }
        if sigma == 0.0 {
            return Err(NormError::NonConvergentFit("zero sigma".to_string()));
        }

        Ok(GaussianFit {
            height,
            mean,
            sigma,
            rss: lsf.rss,
            iterations: lsf.iterations,
        })
    }

    /// Model value at bin-index position `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        apply_gaussian_fit(&self.params(), x)
    }

    /// Parameters as a core `GaussianParams`
    pub fn params(&self) -> GaussianParams {
        GaussianParams {
            height: self.height,
            mean: self.mean,
            sigma: self.sigma,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use histmatch_test::gaussian_histogram;

    #[test]
    fn test_fit_synthetic_mode() {
        let counts = gaussian_histogram(128, 100.0, 64.0, 5.0);
        let hist = Histogram::from_counts(counts, 0.0, 2.0).unwrap();
        let window = ModeWindow::locate(&hist);
        let fit = GaussianFit::fit(&hist, &window, &FitOptions::default()).unwrap();
        assert!((fit.mean - 64.0).abs() < 0.05, "{fit:?}");
        assert!((fit.sigma - 5.0).abs() < 0.05, "{fit:?}");
        assert!((fit.height - 100.0).abs() < 1.0, "{fit:?}");
        assert!((fit.evaluate(64.0) - fit.height).abs() < 1.0);
    }

    #[test]
    fn test_fit_asymmetric_window_still_centers() {
        // Second mode on the right cuts the upper walk short
        let mut counts = gaussian_histogram(64, 400.0, 20.0, 3.0);
        for (i, c) in counts.iter_mut().enumerate().skip(25) {
            *c += (300.0 * (-(i as f64 - 40.0).powi(2) / 18.0).exp()).round() as u32;
        }
        let hist = Histogram::from_counts(counts, 0.0, 1.0).unwrap();
        let window = ModeWindow::locate(&hist);
        assert_eq!(window.peak, 20);
        assert!(window.fit_end < 40);
        let fit = GaussianFit::fit(&hist, &window, &FitOptions::default()).unwrap();
        assert!((fit.mean - 20.0).abs() < 0.2, "{fit:?}");
        assert!((fit.sigma - 3.0).abs() < 0.2, "{fit:?}");
    }

    #[test]
    fn test_insufficient_data() {
        let hist = Histogram::from_counts(vec![5, 5], 0.0, 1.0).unwrap();
        let window = ModeWindow::locate(&hist);
        let err = GaussianFit::fit(&hist, &window, &FitOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            NormError::InsufficientData {
                points: 1,
                required: 3
            }
        ));
    }

    #[test]
    fn test_min_points_option() {
        let counts = gaussian_histogram(16, 50.0, 8.0, 1.0);
        let hist = Histogram::from_counts(counts, 0.0, 1.0).unwrap();
        let window = ModeWindow::locate(&hist);
        let strict = FitOptions {
            min_points: 100,
            ..FitOptions::default()
        };
        assert!(matches!(
            GaussianFit::fit(&hist, &window, &strict),
            Err(NormError::InsufficientData { required: 100, .. })
        ));
        let lax = FitOptions {
            min_points: 0,
            ..FitOptions::default()
        };
        assert!(GaussianFit::fit(&hist, &window, &lax).is_ok());
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let counts = gaussian_histogram(128, 100.0, 64.0, 5.0);
        let hist = Histogram::from_counts(counts, 0.0, 1.0).unwrap();
        let window = ModeWindow::locate(&hist);
        let options = FitOptions {
            lm: LmConfig {
                max_iterations: 0,
                ..LmConfig::default()
            },
            ..FitOptions::default()
        };
        let err = GaussianFit::fit(&hist, &window, &options).unwrap_err();
        assert!(matches!(err, NormError::NonConvergentFit(_)));
    }
}
