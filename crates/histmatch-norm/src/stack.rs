//! Stack orchestration
//!
//! Runs histogram, mode window, Gaussian fit and normalization for every
//! slice of a stack. Slices are independent: in parallel mode each one is a
//! rayon task and results are gathered back in slice order, so the output
//! is the same as a sequential run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::gaussian::{FitOptions, GaussianFit};
use crate::histogram::{BinRange, DEFAULT_NBINS, Histogram};
use crate::normalize::normalize_with_fit;
use crate::window::ModeWindow;
use crate::{NormError, NormResult};
use histmatch_core::{FPix, FPixa};

/// Suffix appended to the title of a normalized stack
pub const TITLE_SUFFIX: &str = "_hm";

/// Shared flag used to stop a running stack normalization
///
/// Clones share the same flag. The flag is checked before each slice
/// starts; slices already running are finished.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for slice and stack normalization
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Number of histogram bins
    pub nbins: usize,
    /// Intensity interval covered by the bins
    pub bin_range: BinRange,
    /// Gaussian fit settings
    pub fit: FitOptions,
    /// Process slices concurrently
    pub parallel: bool,
    /// Optional cancellation flag
    pub cancel: Option<CancelFlag>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            nbins: DEFAULT_NBINS,
            bin_range: BinRange::default(),
            fit: FitOptions::default(),
            parallel: true,
            cancel: None,
        }
    }
}

impl NormalizeOptions {
    /// Set the number of histogram bins
    pub fn with_nbins(mut self, nbins: usize) -> Self {
        self.nbins = nbins;
        self
    }

    /// Set the bin interval
    pub fn with_bin_range(mut self, bin_range: BinRange) -> Self {
        self.bin_range = bin_range;
        self
    }

    /// Set the fit options
    pub fn with_fit(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    /// Enable or disable parallel slice processing
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Attach a cancellation flag
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn validate(&self) -> NormResult<()> {
        if self.nbins == 0 {
            return Err(NormError::InvalidParameters(
                "nbins must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}

/// Intermediate results for one normalized slice
#[derive(Debug, Clone)]
pub struct SliceReport {
    /// Zero-based slice index (0 for a standalone slice)
    pub index: usize,
    /// Histogram of the input slice
    pub histogram: Histogram,
    /// Mode window used for the fit
    pub window: ModeWindow,
    /// Fitted Gaussian in bin units
    pub fit: GaussianFit,
    /// Intensity subtracted from every pixel
    pub offset: f64,
    /// Normalized slice
    pub normalized: FPix,
}

/// Normalize one slice and keep the intermediate results
pub fn normalize_slice_with(slice: &FPix, options: &NormalizeOptions) -> NormResult<SliceReport> {
    options.validate()?;
    run_slice(0, slice, options)
}

fn run_slice(index: usize, slice: &FPix, options: &NormalizeOptions) -> NormResult<SliceReport> {
    log::debug!("fitting slice {}", index + 1);

    let histogram = Histogram::build(slice, options.nbins, options.bin_range)?;
    let window = ModeWindow::locate(&histogram);
    log::debug!(
        "slice {}: peak bin {}, window {}..{}",
        index + 1,
        window.peak,
        window.lower_border,
        window.fit_end
    );

    let fit = GaussianFit::fit(&histogram, &window, &options.fit)?;
    let offset = histogram.intensity_at(fit.mean);
    log::debug!(
        "slice {}: height {:.3}, mean {:.3}, sigma {:.3} ({} iterations)",
        index + 1,
        fit.height,
        fit.mean,
        fit.sigma,
        fit.iterations
    );

    let normalized = normalize_with_fit(slice, &histogram, &fit)?;
    Ok(SliceReport {
        index,
        histogram,
        window,
        fit,
        offset,
        normalized,
    })
}

/// State shared by the slice tasks of one stack run
struct StackRun<'a, F> {
    options: &'a NormalizeOptions,
    /// Lowest index that failed or saw the cancel flag, `usize::MAX` if none
    first_failure: AtomicUsize,
    /// Called with the slice index once a slice has been processed
    after_slice: F,
}

impl<F: Fn(usize) + Sync> StackRun<'_, F> {
    /// Process one slice; `None` when a lower slice already failed
    fn slice(&self, index: usize, slice: &FPix) -> Option<NormResult<SliceReport>> {
        if index > self.first_failure.load(Ordering::Acquire) {
            return None;
        }
        if self.options.is_cancelled() {
            self.first_failure.fetch_min(index, Ordering::AcqRel);
            return Some(Err(NormError::Cancelled));
        }
        let result = run_slice(index, slice, self.options).map_err(|e| {
            log::warn!("slice {} failed: {}", index + 1, e);
            self.first_failure.fetch_min(index, Ordering::AcqRel);
            e.in_slice(index)
        });
        (self.after_slice)(index);
        Some(result)
    }
}

fn run_stack<F>(
    stack: &FPixa,
    options: &NormalizeOptions,
    after_slice: F,
) -> NormResult<Vec<SliceReport>>
where
    F: Fn(usize) + Sync,
{
    options.validate()?;
    if stack.is_empty() {
        return Err(NormError::InvalidParameters(
            "stack has no slices".to_string(),
        ));
    }
    log::info!(
        "normalizing {} slices with {} bins (parallel: {})",
        stack.len(),
        options.nbins,
        options.parallel
    );

    let run = StackRun {
        options,
        first_failure: AtomicUsize::new(usize::MAX),
        after_slice,
    };
    if options.parallel {
        let results: Vec<Option<NormResult<SliceReport>>> = stack
            .slices()
            .par_iter()
            .enumerate()
            .map(|(i, slice)| run.slice(i, slice))
            .collect();
        // Skipped slices all sit above the lowest failure, so the ordered
        // collect stops on that failure before reaching them
        results.into_iter().flatten().collect()
    } else {
        stack
            .iter()
            .enumerate()
            .filter_map(|(i, slice)| run.slice(i, slice))
            .collect()
    }
}

/// Normalize every slice of `stack` and return the per-slice reports
///
/// The first failing slice stops the run: slices above it that have not
/// started yet are skipped.
///
/// # Errors
///
/// - `InvalidParameters` for an empty stack or `nbins == 0`
/// - `Cancelled` if the cancel flag is set before a slice starts
/// - `Slice { index, .. }` wrapping the error of the lowest failing slice
pub fn normalize_stack_reports(
    stack: &FPixa,
    options: &NormalizeOptions,
) -> NormResult<Vec<SliceReport>> {
    run_stack(stack, options, |_| {})
}

/// Normalize every slice of `stack`
///
/// The output has the same slice count and dimensions and is titled
/// `<title>_hm`.
pub fn normalize_stack_with(stack: &FPixa, options: &NormalizeOptions) -> NormResult<FPixa> {
    let reports = normalize_stack_reports(stack, options)?;
    let slices = reports.into_iter().map(|r| r.normalized).collect();
    let out = FPixa::from_slices(slices)?;
    Ok(out.with_title(format!("{}{}", stack.title(), TITLE_SUFFIX)))
}

/// Normalize every slice of `stack` with default options and `nbins` bins
pub fn normalize_stack(stack: &FPixa, nbins: usize) -> NormResult<FPixa> {
    normalize_stack_with(stack, &NormalizeOptions::default().with_nbins(nbins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use histmatch_test::{gaussian_histogram, histogram_slice};
    use std::sync::Mutex;

    fn scenario_slice() -> FPix {
        let counts = gaussian_histogram(128, 100.0, 64.0, 5.0);
        histogram_slice(&counts, 256.0).unwrap()
    }

    #[test]
    fn test_slice_report() {
        let report = normalize_slice_with(&scenario_slice(), &NormalizeOptions::default()).unwrap();
        assert_eq!(report.index, 0);
        assert_eq!(report.histogram.bin_width(), 2.0);
        assert_eq!(report.window.peak, 64);
        assert!((report.fit.mean - 64.0).abs() < 0.05, "{:?}", report.fit);
        assert!((report.fit.sigma - 5.0).abs() < 0.05, "{:?}", report.fit);
        assert!((report.offset - 128.0).abs() < 0.1);
        assert_eq!(report.normalized.display_range(), None);
    }

    #[test]
    fn test_stack_title_and_shape() {
        let stack = FPixa::from_slices(vec![scenario_slice(), scenario_slice()])
            .unwrap()
            .with_title("opt");
        let out = normalize_stack(&stack, 128).unwrap();
        assert_eq!(out.title(), "opt_hm");
        assert_eq!(out.len(), 2);
        assert_eq!(out.dimensions(), stack.dimensions());
    }

    #[test]
    fn test_empty_stack_and_zero_bins() {
        let err = normalize_stack(&FPixa::new(), 128).unwrap_err();
        assert!(matches!(err, NormError::InvalidParameters(_)));

        let stack = FPixa::from_slices(vec![scenario_slice()]).unwrap();
        let err = normalize_stack(&stack, 0).unwrap_err();
        assert!(matches!(err, NormError::InvalidParameters(_)));
    }

    #[test]
    fn test_failing_slice_index() {
        let good = scenario_slice();
        let blank = FPix::new(good.width(), good.height()).unwrap();
        let stack = FPixa::from_slices(vec![good, blank.clone(), blank]).unwrap();
        for parallel in [false, true] {
            let options = NormalizeOptions::default().with_parallel(parallel);
            let err = normalize_stack_with(&stack, &options).unwrap_err();
            assert_eq!(err.slice_index(), Some(1));
            assert!(matches!(err.kind(), NormError::DegenerateRange { .. }));
        }
    }

    #[test]
    fn test_cancel_before_start() {
        let cancel = CancelFlag::new();
        let options = NormalizeOptions::default().with_cancel(cancel.clone());
        cancel.cancel();
        assert!(cancel.is_cancelled());
        let stack = FPixa::from_slices(vec![scenario_slice()]).unwrap();
        let err = normalize_stack_with(&stack, &options).unwrap_err();
        assert!(matches!(err, NormError::Cancelled));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let counts = gaussian_histogram(128, 100.0, 64.0, 5.0);
        let slices: Vec<FPix> = [256.0, 512.0, 100.0, 37.5]
            .iter()
            .map(|&max| histogram_slice(&counts, max).unwrap())
            .collect();
        let stack = FPixa::from_slices(slices).unwrap().with_title("drift");
        let par = normalize_stack_with(&stack, &NormalizeOptions::default()).unwrap();
        let seq =
            normalize_stack_with(&stack, &NormalizeOptions::default().with_parallel(false)).unwrap();
        assert_eq!(par, seq);
        assert_eq!(par.title(), "drift_hm");
    }

    fn failing_first_stack(n: usize) -> FPixa {
        let good = scenario_slice();
        let blank = FPix::new(good.width(), good.height()).unwrap();
        let mut slices = vec![blank];
        slices.extend(std::iter::repeat_n(good, n - 1));
        FPixa::from_slices(slices).unwrap()
    }

    #[test]
    fn test_failure_stops_sequential_run() {
        let stack = failing_first_stack(6);
        let processed = Mutex::new(Vec::new());
        let options = NormalizeOptions::default().with_parallel(false);
        let err = run_stack(&stack, &options, |i| processed.lock().unwrap().push(i)).unwrap_err();
        assert_eq!(err.slice_index(), Some(0));
        assert_eq!(*processed.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_failure_stops_parallel_run() {
        let stack = failing_first_stack(16);
        let processed = Mutex::new(Vec::new());
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let err = pool
            .install(|| {
                run_stack(&stack, &NormalizeOptions::default(), |i| {
                    processed.lock().unwrap().push(i)
                })
            })
            .unwrap_err();
        assert_eq!(err.slice_index(), Some(0));
        assert!(matches!(err.kind(), NormError::DegenerateRange { .. }));
        assert_eq!(*processed.lock().unwrap(), vec![0]);

        // Any pool size reports the same slice
        let err = normalize_stack_with(&stack, &NormalizeOptions::default()).unwrap_err();
        assert_eq!(err.slice_index(), Some(0));
    }

    #[test]
    fn test_cancel_between_slices() {
        let slices = vec![scenario_slice(); 5];
        let stack = FPixa::from_slices(slices).unwrap();
        let cancel = CancelFlag::new();
        let options = NormalizeOptions::default()
            .with_parallel(false)
            .with_cancel(cancel.clone());
        let processed = Mutex::new(Vec::new());
        let err = run_stack(&stack, &options, |i| {
            processed.lock().unwrap().push(i);
            if i == 0 {
                cancel.cancel();
            }
        })
        .unwrap_err();
        assert!(matches!(err, NormError::Cancelled));
        assert_eq!(*processed.lock().unwrap(), vec![0]);
    }
}
