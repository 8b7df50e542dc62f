//! Core data types for formant-sweep
//!
//! These types represent the domain model and flow through the pipeline:
//! audio → segments → ceiling sweep → chosen estimates → result rows.

use crate::error::{FormantSweepError, Result};
use std::ops::Deref;

/// Number of resonances (F1..F5) reported per frame
pub const RESONANCE_COUNT: usize = 5;

// =============================================================================
// Audio
// =============================================================================

/// Decoded mono audio, optionally a slice of a longer recording
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f64>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Time of the first sample's left edge in the source recording (seconds)
    pub start_time: f64,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self::with_start_time(samples, sample_rate, 0.0)
    }

    pub fn with_start_time(samples: Vec<f64>, sample_rate: u32, start_time: f64) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            start_time,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the last sample's right edge
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Copy out `[start, end)` keeping the recording's time stamps.
    ///
    /// The range is clamped to the buffer. Returns `None` when nothing is left.
    pub fn extract(&self, start: f64, end: f64) -> Option<AudioBuffer> {
        if self.sample_rate == 0 {
            return None;
        }
        let rate = self.sample_rate as f64;
        let first = ((start - self.start_time) * rate).round().max(0.0) as usize;
        let last = (((end - self.start_time) * rate).round().max(0.0) as usize).min(self.len());
        if first >= last {
            return None;
        }
        let start_time = self.start_time + first as f64 / rate;
        Some(AudioBuffer::with_start_time(
            self.samples[first..last].to_vec(),
            self.sample_rate,
            start_time,
        ))
    }
}

// =============================================================================
// Segmentation
// =============================================================================

/// A labelled region of an annotation tier
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub label: String,
    pub start: f64,
    pub end: f64,
}

/// Unit of independent analysis: audio plus the label it was cut for
#[derive(Debug, Clone)]
pub struct Segment {
    /// Interval label; `None` in whole-recording mode
    pub label: Option<String>,
    /// Padded audio with recording time stamps
    pub audio: AudioBuffer,
}

impl Segment {
    pub fn new(label: Option<String>, audio: AudioBuffer) -> Self {
        Self { label, audio }
    }

    /// Label for log and error messages
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{:.3}-{:.3}s", self.audio.start_time, self.audio.end_time()),
        }
    }
}

// =============================================================================
// Ceiling sweep
// =============================================================================

/// Upper bound on the number of ceilings in one sweep
pub const MAX_CEILINGS: usize = 10_000;

/// Ceiling values to sweep, low to high inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CeilingSeries {
    low_hz: f64,
    step_hz: f64,
    count: usize,
}

impl CeilingSeries {
    /// Build a series; `high_hz` must sit a whole number of steps above `low_hz`.
    pub fn new(low_hz: f64, high_hz: f64, step_hz: f64) -> Result<Self> {
        if !low_hz.is_finite() || low_hz <= 0.0 {
            return Err(FormantSweepError::ConfigError(format!(
                "lowest ceiling must be positive (got {} Hz)",
                low_hz
            )));
        }
        if !step_hz.is_finite() || step_hz <= 0.0 {
            return Err(FormantSweepError::ConfigError(format!(
                "ceiling step must be positive (got {} Hz)",
                step_hz
            )));
        }
        if !high_hz.is_finite() {
            return Err(FormantSweepError::ConfigError(format!(
                "highest ceiling must be a finite frequency (got {} Hz)",
                high_hz
            )));
        }
        if high_hz < low_hz {
            return Err(FormantSweepError::ConfigError(format!(
                "highest ceiling ({} Hz) is below the lowest ceiling ({} Hz)",
                high_hz, low_hz
            )));
        }

        let steps = (high_hz - low_hz) / step_hz;
        let whole = steps.round();
        if whole >= MAX_CEILINGS as f64 {
            return Err(FormantSweepError::ConfigError(format!(
                "ceiling range {}-{} Hz in {} Hz steps exceeds {} ceilings",
                low_hz, high_hz, step_hz, MAX_CEILINGS
            )));
        }
        if (steps - whole).abs() > 1e-6 {
            return Err(FormantSweepError::ConfigError(format!(
                "ceiling range {}-{} Hz is not a whole number of {} Hz steps",
                low_hz, high_hz, step_hz
            )));
        }

        Ok(Self {
            low_hz,
            step_hz,
            count: whole as usize + 1,
        })
    }

    /// Baseline (lowest) ceiling
    pub fn low_hz(&self) -> f64 {
        self.low_hz
    }

    /// Highest ceiling
    pub fn high_hz(&self) -> f64 {
        self.ceiling(self.count - 1)
    }

    pub fn step_hz(&self) -> f64 {
        self.step_hz
    }

    /// Number of ceilings, baseline included
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false; a series holds at least the baseline
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The `index`-th ceiling, computed from the baseline to avoid drift
    pub fn ceiling(&self, index: usize) -> f64 {
        self.low_hz + index as f64 * self.step_hz
    }

    /// Ceilings in increasing order, baseline first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(move |i| self.ceiling(i))
    }
}

/// One frame reported by a formant estimator
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorFrame {
    /// Frame centre in recording time (seconds)
    pub time: f64,
    /// Candidate frequencies in Hz, ascending, at most the requested order
    pub candidates: Vec<f64>,
}

/// Candidates for one (resonance, frame) pair ordered by increasing ceiling.
///
/// Undefined candidates are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEstimateSequence(Vec<f64>);

impl FrameEstimateSequence {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl Deref for FrameEstimateSequence {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

// =============================================================================
// Results
// =============================================================================

/// One output row: a frame's chosen F1..F5
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub label: Option<String>,
    pub time: f64,
    /// Chosen frequencies in Hz; NaN when undefined
    pub formants: [f64; RESONANCE_COUNT],
}

/// Rows of all successfully analysed segments, in interval order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one segment's rows as a contiguous group
    pub fn append_segment(&mut self, rows: Vec<ResultRow>) {
        self.rows.extend(rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats the decoder accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Flac,
    Mp3,
    Ogg,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "mp3" => Some(AudioFormat::Mp3),
            "ogg" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }
}
