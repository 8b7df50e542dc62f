//! Burg LPC formant estimator
//!
//! For each ceiling the segment is resampled to twice the ceiling, so that
//! the prediction polynomial only has to explain the band below it, then
//! pre-emphasized and cut into Gaussian-windowed frames. Each frame's
//! candidates are the resonances of a Burg fit with two poles per formant.
//!
//! The frame grid depends only on the segment duration and the analysis
//! parameters, so every ceiling sees the same frame times.

use crate::analysis::lpc::{burg, resonances};
use crate::analysis::traits::{EstimatorParams, FormantEstimator};
use crate::audio::resample::resample;
use crate::error::{FormantSweepError, Result};
use crate::types::{AudioBuffer, EstimatorFrame};
use std::f64::consts::PI;
use tracing::trace;

/// Formant estimator backed by Burg linear prediction
#[derive(Debug, Clone, Copy, Default)]
pub struct BurgEstimator;

impl BurgEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl FormantEstimator for BurgEstimator {
    fn estimate(
        &self,
        audio: &AudioBuffer,
        ceiling_hz: f64,
        params: &EstimatorParams,
    ) -> Result<Vec<EstimatorFrame>> {
        if audio.sample_rate == 0 {
            return Err(FormantSweepError::EstimationError {
                label: String::new(),
                reason: "sample rate is zero".to_string(),
            });
        }
        if ceiling_hz.is_nan() || ceiling_hz <= 0.0 {
            return Err(FormantSweepError::EstimationError {
                label: String::new(),
                reason: format!("invalid ceiling {} Hz", ceiling_hz),
            });
        }

        let times = frame_times(audio.duration, params.window_s, params.frame_step_s);
        if times.is_empty() {
            return Ok(Vec::new());
        }

        let source_rate = audio.sample_rate as f64;
        let ceiling = ceiling_hz.min(source_rate / 2.0);
        let target_rate = (2.0 * ceiling).round() as u32;

        let (mut samples, rate) = if audio.sample_rate > target_rate {
            (
                resample(&audio.samples, audio.sample_rate, target_rate),
                target_rate as f64,
            )
        } else {
            (audio.samples.clone(), source_rate)
        };
        pre_emphasize(&mut samples, params.preemphasis_hz, rate);

        let window = formant_window((2.0 * params.window_s * rate).floor() as usize);
        let lpc_order = 2 * params.order;

        trace!(
            "Burg at {:.0} Hz: {} samples @ {:.0} Hz, {} frames, window {}",
            ceiling,
            samples.len(),
            rate,
            times.len(),
            window.len()
        );

        Ok(times
            .into_iter()
            .map(|t| {
                let frame = windowed_frame(&samples, rate, t, &window);
                let candidates = match burg(&frame, lpc_order) {
                    Some(fit) => {
                        let mut found = resonances(&fit.coefficients, rate);
                        found.truncate(params.order);
                        found
                    }
                    None => Vec::new(),
                };
                EstimatorFrame {
                    time: audio.start_time + t,
                    candidates,
                }
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "burg"
    }
}

/// Frame centres relative to the buffer start.
///
/// Frames are centred in the buffer; none fit if it is shorter than one
/// analysis window (twice `window_s`).
pub fn frame_times(duration: f64, window_s: f64, step_s: f64) -> Vec<f64> {
    let analysis_window = 2.0 * window_s;
    if step_s.is_nan() || step_s <= 0.0 || duration.is_nan() || duration < analysis_window {
        return Vec::new();
    }

    let count = 1 + ((duration - analysis_window) / step_s + 1e-9).floor() as usize;
    let first = 0.5 * (duration - (count - 1) as f64 * step_s);
    (0..count).map(|i| first + i as f64 * step_s).collect()
}

/// First-order pre-emphasis from `from_hz`, in place
fn pre_emphasize(samples: &mut [f64], from_hz: f64, sample_rate: f64) {
    if from_hz <= 0.0 {
        return;
    }
    let alpha = (-2.0 * PI * from_hz / sample_rate).exp();
    for i in (1..samples.len()).rev() {
        samples[i] -= alpha * samples[i - 1];
    }
}

/// Gaussian window falling to zero at both edges
fn formant_window(size: usize) -> Vec<f64> {
    let edge = (-12.0_f64).exp();
    let mid = (size as f64 - 1.0) / 2.0;
    let denom = (size + 1) as f64;
    (0..size)
        .map(|i| {
            let diff = i as f64 - mid;
            ((-48.0 * diff * diff / (denom * denom)).exp() - edge) / (1.0 - edge)
        })
        .collect()
}

/// Samples around `time` multiplied by the window.
///
/// The window is anchored on the unclamped frame start, so frames touching
/// the buffer edges use only the part of the window that overlaps audio.
fn windowed_frame(samples: &[f64], sample_rate: f64, time: f64, window: &[f64]) -> Vec<f64> {
    let half = (window.len() / 2) as isize;
    let left = (time * sample_rate - 0.5).floor() as isize;
    let start = left + 1 - half;
    let end = left + half;

    let first = start.max(0);
    let last = end.min(samples.len() as isize - 1);
    if last < first {
        return Vec::new();
    }

    (first..=last)
        .map(|i| {
            let w = window.get((i - start) as usize).copied().unwrap_or(0.0);
            samples[i as usize] * w
        })
        .collect()
}
