//! Sample-rate conversion using rubato
//!
//! The LPC stage analyses each ceiling at twice the ceiling frequency, so a
//! segment is resampled once per ceiling. FFT resampling gives the
//! anti-aliasing the formant fit needs; the resampler's latency is removed so
//! that sample `i` of the output lines up with time `i / to_rate`.

use rubato::{FftFixedInOut, Resampler};
use tracing::debug;

/// Input chunk size handed to rubato (it may round this up)
const CHUNK_SIZE: usize = 1024;

/// Resample mono audio from `from_rate` to `to_rate`.
///
/// The output holds `ceil(len · to_rate / from_rate)` samples.
pub fn resample(samples: &[f64], from_rate: u32, to_rate: u32) -> Vec<f64> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let mut resampler =
        match FftFixedInOut::<f64>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 1) {
            Ok(r) => r,
            Err(e) => {
                debug!("Rubato initialization failed ({}), using fallback", e);
                return resample_linear(samples, from_rate, to_rate);
            }
        };

    let ratio = to_rate as f64 / from_rate as f64;
    let expected = (samples.len() as f64 * ratio).ceil() as usize;
    let delay = resampler.output_delay();
    let chunk_in = resampler.input_frames_next();

    let mut output = Vec::with_capacity(expected + delay + resampler.output_frames_next());
    let mut pos = 0;

    // Keep feeding (zero-padded past the end) until the delayed tail is out
    while output.len() < expected + delay {
        let mut chunk = vec![0.0; chunk_in];
        if pos < samples.len() {
            let end = (pos + chunk_in).min(samples.len());
            chunk[..end - pos].copy_from_slice(&samples[pos..end]);
        }

        match resampler.process(&[chunk], None) {
            Ok(resampled) => {
                if let Some(channel) = resampled.first() {
                    output.extend_from_slice(channel);
                }
            }
            Err(e) => {
                debug!("Rubato processing error ({}), using fallback", e);
                return resample_linear(samples, from_rate, to_rate);
            }
        }
        pos += chunk_in;
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    output
}

/// Linear interpolation, used only when rubato cannot handle the rates
fn resample_linear(samples: &[f64], from_rate: u32, to_rate: u32) -> Vec<f64> {
    if samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }

    let step = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / step).ceil() as usize;
    let last = samples.len() - 1;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 * step;
            let idx = (src_pos as usize).min(last);
            let frac = src_pos - idx as f64;
            if idx < last {
                samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
            } else {
                samples[last]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, rate: u32, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / rate as f64).sin())
            .collect()
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_resample_length() {
        let samples = sine(200.0, 16000, 8000);
        assert_eq!(resample(&samples, 16000, 10000).len(), 5000);
        assert_eq!(resample(&samples, 16000, 7100).len(), 3550);
    }

    #[test]
    fn test_resample_preserves_phase() {
        // After delay compensation a low tone stays aligned in time
        let samples = sine(100.0, 16000, 16000);
        let result = resample(&samples, 16000, 8000);
        let reference = sine(100.0, 8000, 8000);
        for i in (1000..7000).step_by(250) {
            assert!(
                (result[i] - reference[i]).abs() < 0.1,
                "sample {}: {} vs {}",
                i,
                result[i],
                reference[i]
            );
        }
    }

    #[test]
    fn test_resample_keeps_amplitude() {
        let result = resample(&sine(440.0, 44100, 4410), 44100, 11000);
        let max = result.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max > 0.9, "max {}", max);
    }

    #[test]
    fn test_linear_fallback() {
        let samples: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let result = resample_linear(&samples, 2, 1);
        assert_eq!(result.len(), 50);
        assert_eq!(result[10], 20.0);
    }
}
