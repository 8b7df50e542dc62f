//! Ceiling sweep sampling
//!
//! Runs the estimator once per ceiling and regroups its output into one
//! [`FrameEstimateSequence`] per (resonance, frame). The baseline call fixes
//! the frame grid; every later call must reproduce it.

use crate::analysis::traits::{EstimatorParams, FormantEstimator};
use crate::error::{FormantSweepError, Result};
use crate::types::{CeilingSeries, EstimatorFrame, FrameEstimateSequence, Segment};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Everything a segment's sweep needs besides the audio
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub ceilings: CeilingSeries,
    pub params: EstimatorParams,
    /// Abandon the segment once this much time has passed
    pub timeout: Option<Duration>,
}

/// Per-(resonance, frame) candidate sequences for one segment
#[derive(Debug, Clone, PartialEq)]
pub struct CeilingSweep {
    /// Frame times from the baseline run
    pub times: Vec<f64>,
    /// Indexed `[resonance][frame]`; every sequence has one value per ceiling
    pub sequences: Vec<Vec<FrameEstimateSequence>>,
}

impl CeilingSweep {
    pub fn frame_count(&self) -> usize {
        self.times.len()
    }

    pub fn resonance_count(&self) -> usize {
        self.sequences.len()
    }
}

/// Sweep `segment` across every ceiling in `config.ceilings`
pub fn sample(
    segment: &Segment,
    estimator: &dyn FormantEstimator,
    config: &SweepConfig,
) -> Result<CeilingSweep> {
    let started = Instant::now();
    let label = segment.display_label();
    let resonances = config.params.order;

    let baseline = run_estimator(segment, estimator, config.ceilings.low_hz(), config, &label)?;
    let frame_count = baseline.len();
    let times: Vec<f64> = baseline.iter().map(|f| f.time).collect();

    debug!(
        "Sweeping '{}' with {}: {} frames x {} ceilings",
        label,
        estimator.name(),
        frame_count,
        config.ceilings.len()
    );

    // [resonance][frame] -> candidates in ceiling order
    let mut grid: Vec<Vec<Vec<f64>>> =
        vec![vec![Vec::with_capacity(config.ceilings.len()); frame_count]; resonances];
    push_frames(&mut grid, &baseline);

    for ceiling_hz in config.ceilings.iter().skip(1) {
        if let Some(limit) = config.timeout {
            let elapsed = started.elapsed();
            if elapsed >= limit {
                return Err(FormantSweepError::SegmentTimeout {
                    label,
                    elapsed_secs: elapsed.as_secs_f64(),
                });
            }
        }

        let frames = run_estimator(segment, estimator, ceiling_hz, config, &label)?;
        if frames.len() != frame_count {
            return Err(FormantSweepError::EstimatorInconsistency {
                label,
                ceiling_hz,
                expected: frame_count,
                found: frames.len(),
            });
        }
        trace!("'{}' ceiling {} Hz done", label, ceiling_hz);
        push_frames(&mut grid, &frames);
    }

    Ok(CeilingSweep {
        times,
        sequences: grid
            .into_iter()
            .map(|frames| frames.into_iter().map(FrameEstimateSequence::new).collect())
            .collect(),
    })
}

fn run_estimator(
    segment: &Segment,
    estimator: &dyn FormantEstimator,
    ceiling_hz: f64,
    config: &SweepConfig,
    label: &str,
) -> Result<Vec<EstimatorFrame>> {
    estimator
        .estimate(&segment.audio, ceiling_hz, &config.params)
        .map_err(|e| match e {
            FormantSweepError::EstimationError { reason, .. } => FormantSweepError::EstimationError {
                label: label.to_string(),
                reason,
            },
            other => other,
        })
}

/// Append each frame's candidates; missing resonances become NaN
fn push_frames(grid: &mut [Vec<Vec<f64>>], frames: &[EstimatorFrame]) {
    for (resonance, per_frame) in grid.iter_mut().enumerate() {
        for (sequence, frame) in per_frame.iter_mut().zip(frames) {
            sequence.push(frame.candidates.get(resonance).copied().unwrap_or(f64::NAN));
        }
    }
}
