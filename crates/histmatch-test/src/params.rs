//! Regression test parameters and operations

use histmatch_core::FPix;

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, and success status. Every comparison
/// increments the index so failures can be located in the output.
pub struct RegParams {
    /// Name of the test (e.g., "histogram")
    pub test_name: String,
    /// Current test index (incremented before each test)
    index: usize,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// # Arguments
    ///
    /// * `test_name` - Name of the test (e.g., "histogram")
    pub fn new(test_name: &str) -> Self {
        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value (typically from golden/reference)
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        // NaN never compares within delta
        if !(diff <= delta) {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            return self.fail(msg);
        }
        true
    }

    /// Check a boolean condition
    pub fn compare_bool(&mut self, expected: bool, actual: bool) -> bool {
        self.index += 1;

        if expected != actual {
            let msg = format!(
                "Failure in {}_reg: bool comparison for index {} - expected {}, got {}",
                self.test_name, self.index, expected, actual
            );
            return self.fail(msg);
        }
        true
    }

    /// Compare two count arrays for exact equality
    pub fn compare_counts(&mut self, expected: &[u32], actual: &[u32]) -> bool {
        self.index += 1;

        if expected.len() != actual.len() {
            let msg = format!(
                "Failure in {}_reg: count comparison for index {} - lengths {} vs {}",
                self.test_name,
                self.index,
                expected.len(),
                actual.len()
            );
            return self.fail(msg);
        }
        if let Some(i) = expected.iter().zip(actual).position(|(e, a)| e != a) {
            let msg = format!(
                "Failure in {}_reg: count comparison for index {} - bin {}: expected {}, got {}",
                self.test_name, self.index, i, expected[i], actual[i]
            );
            return self.fail(msg);
        }
        true
    }

    /// Compare two FPix images pixel by pixel
    ///
    /// # Arguments
    ///
    /// * `fpix1` - First image
    /// * `fpix2` - Second image
    /// * `delta` - Maximum allowed absolute difference per pixel
    ///
    /// # Returns
    ///
    /// `true` if dimensions match and every pixel is within delta.
    pub fn compare_fpix(&mut self, fpix1: &FPix, fpix2: &FPix, delta: f32) -> bool {
        self.index += 1;

        if fpix1.dimensions() != fpix2.dimensions() {
            let msg = format!(
                "Failure in {}_reg: fpix comparison for index {} - dimension mismatch {:?} vs {:?}",
                self.test_name,
                self.index,
                fpix1.dimensions(),
                fpix2.dimensions()
            );
            return self.fail(msg);
        }

        let width = fpix1.width() as usize;
        for (i, (&p1, &p2)) in fpix1.data().iter().zip(fpix2.data()).enumerate() {
            if !((p1 - p2).abs() <= delta) {
                let msg = format!(
                    "Failure in {}_reg: fpix comparison for index {} - pixel mismatch at ({}, {}): {} vs {}",
                    self.test_name,
                    self.index,
                    i % width,
                    i / width,
                    p1,
                    p2
                );
                return self.fail(msg);
            }
        }

        true
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all tests passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_values_success() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.0, 0.0));
        assert!(rp.is_success());
    }

    #[test]
    fn test_compare_values_within_delta() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.compare_values(1.0, f64::NAN, 10.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 2);
        assert_eq!(rp.index(), 2);
    }

    #[test]
    fn test_compare_counts() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_counts(&[1, 2, 3], &[1, 2, 3]));
        assert!(!rp.compare_counts(&[1, 2, 3], &[1, 2]));
        assert!(!rp.compare_counts(&[1, 2, 3], &[1, 5, 3]));
    }

    #[test]
    fn test_compare_fpix() {
        let mut rp = RegParams::new("test");
        let a = FPix::from_data(2, 1, vec![1.0, 2.0]).unwrap();
        let b = FPix::from_data(2, 1, vec![1.0, 2.05]).unwrap();
        assert!(rp.compare_fpix(&a, &b, 0.1));
        assert!(!rp.compare_fpix(&a, &b, 0.01));
        assert!(!rp.compare_fpix(&a, &FPix::new(1, 2).unwrap(), 1.0));
    }
}
