//! Linear prediction utilities
//!
//! Burg's method for the prediction coefficients, and resonance frequencies
//! from the roots of the prediction polynomial.

use nalgebra::DMatrix;
use num_complex::Complex;
use std::f64::consts::PI;

/// Candidates closer than this to 0 Hz or Nyquist are discarded
const EDGE_MARGIN_HZ: f64 = 50.0;

/// Result of a Burg fit
#[derive(Debug, Clone)]
pub struct LpcFit {
    /// Coefficients d[0..m] with x[n] ≈ Σ d[k]·x[n-1-k]
    pub coefficients: Vec<f64>,
    /// Residual mean-square error
    pub error_power: f64,
}

/// Fit an all-pole model of `order` poles with Burg's method.
///
/// Returns `None` when there are not enough samples for the order. A silent
/// frame yields all-zero coefficients.
pub fn burg(samples: &[f64], order: usize) -> Option<LpcFit> {
    let n = samples.len();
    if order == 0 || n < order + 2 {
        return None;
    }

    let mut coefficients = vec![0.0; order];
    let mut previous = vec![0.0; order];
    let mut forward: Vec<f64> = samples[..n - 1].to_vec();
    let mut backward: Vec<f64> = samples[1..].to_vec();
    let mut error_power = samples.iter().map(|x| x * x).sum::<f64>() / n as f64;

    for k in 0..order {
        let mut num = 0.0;
        let mut den = 0.0;
        for j in 0..n - 1 - k {
            num += forward[j] * backward[j];
            den += forward[j] * forward[j] + backward[j] * backward[j];
        }
        if den <= 0.0 {
            break;
        }

        let reflection = 2.0 * num / den;
        coefficients[k] = reflection;
        error_power *= 1.0 - reflection * reflection;
        for i in 0..k {
            coefficients[i] = previous[i] - reflection * previous[k - 1 - i];
        }
        if k + 1 == order {
            break;
        }

        previous[..=k].copy_from_slice(&coefficients[..=k]);
        for j in 0..n - 2 - k {
            forward[j] -= reflection * backward[j];
            backward[j] = backward[j + 1] - reflection * forward[j + 1];
        }
    }

    Some(LpcFit {
        coefficients,
        error_power,
    })
}

/// Resonance frequencies (Hz, ascending) implied by prediction coefficients.
///
/// Roots outside the unit circle are reflected inside; roots in the upper
/// half-plane map to frequencies, and those within 50 Hz of DC or Nyquist
/// are dropped.
pub fn resonances(coefficients: &[f64], sample_rate: f64) -> Vec<f64> {
    let m = coefficients.len();
    if m == 0 {
        return Vec::new();
    }

    // z^m - d0 z^(m-1) - ... - d(m-1), ascending powers
    let mut polynomial = vec![0.0; m + 1];
    for (i, &d) in coefficients.iter().enumerate() {
        polynomial[m - 1 - i] = -d;
    }
    polynomial[m] = 1.0;

    let nyquist = sample_rate / 2.0;
    let mut frequencies: Vec<f64> = polynomial_roots(&polynomial)
        .into_iter()
        .map(|root| {
            let magnitude_sq = root.norm_sqr();
            if magnitude_sq > 1.0 {
                root / magnitude_sq
            } else {
                root
            }
        })
        .filter(|root| root.im >= 0.0)
        .map(|root| root.im.atan2(root.re).abs() * nyquist / PI)
        .filter(|&f| f > EDGE_MARGIN_HZ && f < nyquist - EDGE_MARGIN_HZ)
        .collect();

    frequencies.sort_by(f64::total_cmp);
    frequencies
}

/// Roots of `c[0] + c[1] z + ... + c[n] z^n` via companion-matrix eigenvalues
pub fn polynomial_roots(coefficients: &[f64]) -> Vec<Complex<f64>> {
    if coefficients.is_empty() {
        return Vec::new();
    }

    let mut degree = coefficients.len().saturating_sub(1);
    while degree > 0 && coefficients[degree].abs() < 1e-15 {
        degree -= 1;
    }

    // Vanishing low-order terms are roots at the origin; the companion matrix
    // of a pure power of z is nilpotent and stalls the QR iteration
    let zeros = coefficients[..degree].iter().take_while(|c| **c == 0.0).count();
    let mut roots = vec![Complex::new(0.0, 0.0); zeros];
    let reduced = &coefficients[zeros..=degree];
    let degree = reduced.len() - 1;
    if degree == 0 {
        return roots;
    }

    let leading = reduced[degree];
    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..degree {
        companion[(i, degree - 1)] = -reduced[i] / leading;
    }

    roots.extend(
        companion
            .complex_eigenvalues()
            .iter()
            .map(|c| Complex::new(c.re, c.im)),
    );
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Deterministic white-ish excitation
    fn excitation(n: usize) -> Vec<f64> {
        let mut state: u64 = 0x2545F4914F6CDD1D;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5
            })
            .collect()
    }

    /// Two-pole resonator at `freq` driven by noise
    fn resonator(freq: f64, radius: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        let theta = 2.0 * PI * freq / sample_rate;
        let a1 = 2.0 * radius * theta.cos();
        let a2 = -radius * radius;
        let mut y = vec![0.0; n];
        for (i, e) in excitation(n).into_iter().enumerate() {
            let y1 = if i >= 1 { y[i - 1] } else { 0.0 };
            let y2 = if i >= 2 { y[i - 2] } else { 0.0 };
            y[i] = e + a1 * y1 + a2 * y2;
        }
        y
    }

    #[test]
    fn test_burg_recovers_two_pole_model() {
        let signal = resonator(1000.0, 0.95, 10000.0, 4000);
        let fit = burg(&signal, 2).unwrap();
        let theta = 2.0 * PI * 0.1;
        assert_relative_eq!(fit.coefficients[0], 1.9 * theta.cos(), epsilon = 0.05);
        assert_relative_eq!(fit.coefficients[1], -0.9025, epsilon = 0.05);
        assert!(fit.error_power > 0.0);
    }

    #[test]
    fn test_resonance_frequency_from_fit() {
        let signal = resonator(1000.0, 0.95, 10000.0, 4000);
        let fit = burg(&signal, 2).unwrap();
        let freqs = resonances(&fit.coefficients, 10000.0);
        assert_eq!(freqs.len(), 1);
        assert!((freqs[0] - 1000.0).abs() < 30.0, "got {}", freqs[0]);
    }

    #[test]
    fn test_burg_silence_and_short_input() {
        let fit = burg(&[0.0; 64], 10).unwrap();
        assert!(fit.coefficients.iter().all(|&c| c == 0.0));
        assert!(resonances(&fit.coefficients, 10000.0).is_empty());
        assert!(burg(&[0.1, 0.2, 0.3], 10).is_none());
    }

    #[test]
    fn test_polynomial_roots_real() {
        // (z - 0.5)(z - 0.25)
        let mut roots: Vec<f64> = polynomial_roots(&[0.125, -0.75, 1.0])
            .iter()
            .map(|r| r.re)
            .collect();
        roots.sort_by(f64::total_cmp);
        assert_relative_eq!(roots[0], 0.25, epsilon = 1e-9);
        assert_relative_eq!(roots[1], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_polynomial_roots_complex_pair() {
        // z^2 + 1
        let roots = polynomial_roots(&[1.0, 0.0, 1.0]);
        assert_eq!(roots.len(), 2);
        for root in roots {
            assert_relative_eq!(root.re, 0.0, epsilon = 1e-9);
            assert_relative_eq!(root.im.abs(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_resonances_sorted_and_within_band() {
        // Poles at 500 Hz and 2000 Hz, fs = 8000
        let fs = 8000.0;
        let pole = |f: f64| Complex::from_polar(0.97, 2.0 * PI * f / fs);
        let (p1, p2) = (pole(2000.0), pole(500.0));
        // Expand (z-p1)(z-p1*)(z-p2)(z-p2*) into prediction coefficients
        let q1 = [p1.norm_sqr(), -2.0 * p1.re, 1.0];
        let q2 = [p2.norm_sqr(), -2.0 * p2.re, 1.0];
        let mut poly = [0.0; 5];
        for (i, a) in q1.iter().enumerate() {
            for (j, b) in q2.iter().enumerate() {
                poly[i + j] += a * b;
            }
        }
        // poly = z^4 + poly[3] z^3 + ... ; coefficients d = -poly[3], -poly[2], ...
        let d: Vec<f64> = (0..4).map(|k| -poly[3 - k]).collect();
        let freqs = resonances(&d, fs);
        assert_eq!(freqs.len(), 2);
        assert!((freqs[0] - 500.0).abs() < 1e-6);
        assert!((freqs[1] - 2000.0).abs() < 1e-6);
    }
}
