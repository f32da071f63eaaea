//! Deterministic synthetic slices for regression tests

use crate::error::{TestError, TestResult};
use histmatch_core::FPix;

/// Simple linear congruential generator for reproducible randomness
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed as u64 }
    }

    pub fn next_u64(&mut self) -> u64 {
        // Knuth's MMIX multiplier and increment
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Uniform value in (0, 1]
    pub fn next_f64(&mut self) -> f64 {
        ((self.next_u64() >> 11) + 1) as f64 / (1u64 << 53) as f64
    }

    /// Standard normal sample (Box-Muller)
    pub fn next_gaussian(&mut self) -> f64 {
        let u1 = self.next_f64();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

/// Rounded Gaussian bin counts: `round(height * exp(-(i-mean)^2 / (2 sigma^2)))`
pub fn gaussian_histogram(nbins: usize, height: f64, mean: f64, sigma: f64) -> Vec<u32> {
    (0..nbins)
        .map(|i| {
            let dx = i as f64 - mean;
            (height * (-0.5 * dx * dx / (sigma * sigma)).exp()).round() as u32
        })
        .collect()
}

/// Build a slice whose `[0, max]` histogram with `counts.len()` bins is
/// exactly `counts`.
///
/// Every pixel sits at the center of its bin. The slice gets the display
/// range `(0, max)`, and its shape is the most square factorization of the
/// total count.
pub fn histogram_slice(counts: &[u32], max: f32) -> TestResult<FPix> {
    if counts.is_empty() {
        return Err(TestError::InvalidSynthetic("no bins".to_string()));
    }
    if !(max > 0.0) {
        return Err(TestError::InvalidSynthetic(format!("max must be > 0, got {max}")));
    }
    let total: u64 = counts.iter().map(|&c| c as u64).sum();
    if total == 0 || total > u32::MAX as u64 {
        return Err(TestError::InvalidSynthetic(format!(
            "unusable pixel count {total}"
        )));
    }

    let bin_width = max as f64 / counts.len() as f64;
    let mut data = Vec::with_capacity(total as usize);
    for (i, &count) in counts.iter().enumerate() {
        let value = ((i as f64 + 0.5) * bin_width) as f32;
        data.extend(std::iter::repeat_n(value, count as usize));
    }

    let total = total as u32;
    let height = (1..=(total as f64).sqrt() as u32)
        .rev()
        .find(|d| total % d == 0)
        .unwrap_or(1);
    let width = total / height;

    Ok(FPix::from_data(width, height, data)?.with_display_range(0.0, max)?)
}

/// Slice of normally distributed values with the given mean and sigma
pub fn gaussian_slice(width: u32, height: u32, mean: f64, sigma: f64, seed: u32) -> TestResult<FPix> {
    let mut rng = SimpleRng::new(seed);
    Ok(FPix::from_fn(width, height, |_, _| {
        (mean + sigma * rng.next_gaussian()) as f32
    })?)
}

/// Slice with every pixel set to `value`
pub fn uniform_slice(width: u32, height: u32, value: f32) -> TestResult<FPix> {
    Ok(FPix::new_with_value(width, height, value)?)
}

/// Slice whose values rise linearly from `lo` (first pixel) to `hi`
/// (last pixel) in row-major order
pub fn ramp_slice(width: u32, height: u32, lo: f32, hi: f32) -> TestResult<FPix> {
    let n = (width as u64 * height as u64).saturating_sub(1).max(1) as f64;
    Ok(FPix::from_fn(width, height, |x, y| {
        let i = y as f64 * width as f64 + x as f64;
        (lo as f64 + (hi - lo) as f64 * i / n) as f32
    })?)
}
