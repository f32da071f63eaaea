//! Gaussian least-squares fitting regression test
//!
//! Fits noisy and exact Gaussian samples with Levenberg-Marquardt and
//! checks parameter recovery.

use histmatch_core::{GaussianParams, LmConfig, Pta, apply_gaussian_fit};
use histmatch_test::{RegParams, SimpleRng};

fn sample(params: &GaussianParams, xs: impl Iterator<Item = f64>) -> Pta {
    let mut pta = Pta::new();
    for x in xs {
        pta.push(x, apply_gaussian_fit(params, x));
    }
    pta
}

// ==========================================================================
// Test 1: Exact samples
// ==========================================================================

#[test]
fn lsf_reg_exact() {
    let mut rp = RegParams::new("lsf_exact");

    let truth = GaussianParams {
        height: 250.0,
        mean: 31.7,
        sigma: 4.2,
    };
    let pta = sample(&truth, (20..45).map(|i| i as f64));

    let guess = pta.guess_gaussian().unwrap();
    rp.compare_values(32.0, guess.mean, 0.0);
    rp.compare_values(truth.sigma, guess.sigma, 0.5);

    let lsf = pta.get_gaussian_lsf(guess, &LmConfig::default()).unwrap();
    rp.compare_bool(true, lsf.converged);
    rp.compare_values(truth.height, lsf.params.height, 1e-2);
    rp.compare_values(truth.mean, lsf.params.mean, 1e-4);
    rp.compare_values(truth.sigma, lsf.params.sigma, 1e-4);
    rp.compare_values(0.0, lsf.rss, 1e-6);

    assert!(rp.cleanup(), "lsf_reg exact tests failed");
}

// ==========================================================================
// Test 2: Noisy samples
// ==========================================================================

#[test]
fn lsf_reg_noisy() {
    let mut rp = RegParams::new("lsf_noisy");

    let truth = GaussianParams {
        height: 1000.0,
        mean: 12.0,
        sigma: 2.5,
    };
    let mut rng = SimpleRng::new(99);
    let mut pta = Pta::new();
    for i in 0..25 {
        let x = i as f64;
        pta.push(x, apply_gaussian_fit(&truth, x) + 2.0 * rng.next_gaussian());
    }

    let lsf = pta
        .get_gaussian_lsf(pta.guess_gaussian().unwrap(), &LmConfig::default())
        .unwrap();
    rp.compare_bool(true, lsf.converged);
    rp.compare_values(truth.mean, lsf.params.mean, 0.05);
    rp.compare_values(truth.sigma, lsf.params.sigma, 0.05);
    rp.compare_values(truth.height, lsf.params.height, 10.0);

    assert!(rp.cleanup(), "lsf_reg noisy tests failed");
}

// ==========================================================================
// Test 3: Invalid input
// ==========================================================================

#[test]
fn lsf_reg_invalid() {
    let mut rp = RegParams::new("lsf_invalid");

    let pta = Pta::from_vecs(vec![0.0, 1.0], vec![3.0, 4.0]).unwrap();
    let guess = GaussianParams {
        height: 4.0,
        mean: 1.0,
        sigma: 1.0,
    };
    rp.compare_bool(true, pta.get_gaussian_lsf(guess, &LmConfig::default()).is_err());
    rp.compare_bool(true, Pta::from_vecs(vec![0.0], vec![]).is_err());

    assert!(rp.cleanup(), "lsf_reg invalid tests failed");
}
