//! Mode window location
//!
//! Finds the dominant peak of a histogram and the contiguous run of bins
//! around it over which the counts do not increase moving away from the
//! peak. Those bins are the observations for the Gaussian fit; bins past
//! the first rise are treated as belonging to other modes or tails.

use std::ops::Range;

use crate::histogram::Histogram;
use histmatch_core::Pta;

/// Bin range around the dominant histogram peak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeWindow {
    /// Index of the highest bin (lowest index on ties)
    pub peak: usize,
    /// First bin of the window
    pub lower_border: usize,
    /// Bin where the upper walk stopped
    pub upper_border: usize,
    /// Exclusive end of the bins used as fit observations
    pub fit_end: usize,
}

impl ModeWindow {
    /// Locate the mode window of `hist`
    ///
    /// Lower walk: compare bin `peak - 1` against `peak` and slide the pair
    /// left while the outer count is `<=` the inner one and the outer
    /// index is above 0. The lower border is the final inner index.
    ///
    /// Upper walk: compare bin `peak + 1` against `peak` and slide the pair
    /// right while the outer count is `<=` the inner one and the outer
    /// index is below `nbins - 1`. The final outer index is both the upper
    /// border and the exclusive end of the fit observations.
    ///
    /// When the peak is the last bin there is no upper walk: the upper
    /// border is the peak itself and the observations run to the end of
    /// the histogram.
    pub fn locate(hist: &Histogram) -> ModeWindow {
        let h = hist.counts();
        let last = h.len() - 1;
        let peak = hist.peak_index();

        let lower_border = if peak == 0 {
            0
        } else {
            let mut upper = peak;
            let mut lower = peak - 1;
            while lower > 0 && h[lower] <= h[upper] {
                upper -= 1;
                lower -= 1;
            }
            upper
        };

        let (upper_border, fit_end) = if peak == last {
            (last, last + 1)
        } else {
            let mut upper = peak + 1;
            let mut lower = peak;
            while upper < last && h[lower] >= h[upper] {
                upper += 1;
                lower += 1;
            }
            (upper, upper)
        };

        ModeWindow {
            peak,
            lower_border,
            upper_border,
            fit_end,
        }
    }

    /// Bin indices used as fit observations
    #[inline]
    pub fn fit_range(&self) -> Range<usize> {
        self.lower_border..self.fit_end
    }

    /// Number of fit observations
    #[inline]
    pub fn len(&self) -> usize {
        self.fit_end.saturating_sub(self.lower_border)
    }

    /// True when the window yields no observations
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(bin index, count)` observations for the Gaussian fit
    pub fn observations(&self, hist: &Histogram) -> Pta {
        let mut pta = Pta::with_capacity(self.len());
        for (i, &count) in hist.counts()[self.fit_range()].iter().enumerate() {
            pta.push((self.lower_border + i) as f64, count as f64);
        }
        pta
    }
}
