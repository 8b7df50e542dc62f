//! Unified error types for formant-sweep
//!
//! Error strategy:
//! - Per-segment errors (empty interval, estimator mismatch, timeout): the
//!   segment is reported and left out of the table, the recording continues
//! - Per-recording errors (decode, annotation): the recording is skipped,
//!   the batch continues
//! - System errors (configuration, output): fatal, abort the run
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "WAV, FLAC, MP3, OGG";

/// Top-level error type for formant-sweep operations
#[derive(Debug, Error)]
pub enum FormantSweepError {
    // =========================================================================
    // Segment-level errors - drop the segment, continue the recording
    // =========================================================================
    #[error("Segment '{label}' is empty: {reason}")]
    EmptySegment { label: String, reason: String },

    #[error("Estimator returned {found} frames at ceiling {ceiling_hz} Hz for segment '{label}', but {expected} at the baseline ceiling\n  Tip: the estimator must produce the same frame grid for every ceiling")]
    EstimatorInconsistency {
        label: String,
        ceiling_hz: f64,
        expected: usize,
        found: usize,
    },

    #[error("Formant estimation failed for segment '{label}': {reason}")]
    EstimationError { label: String, reason: String },

    #[error("Segment '{label}' abandoned after {elapsed_secs:.1}s\n  Tip: raise --timeout or narrow the ceiling range")]
    SegmentTimeout { label: String, elapsed_secs: f64 },

    // =========================================================================
    // Recording-level errors - skip the recording, continue the batch
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Cannot read annotation '{path}': {reason}\n  Tip: save the TextGrid from Praat as a text file (long or short format)")]
    AnnotationError { path: PathBuf, reason: String },

    #[error("Tier {tier} not found in '{path}' ({available} tiers available)\n  Tip: tiers are numbered from 1, select one with --tier")]
    TierNotFound {
        path: PathBuf,
        tier: usize,
        available: usize,
    },

    // =========================================================================
    // Fatal errors - abort the run
    // =========================================================================
    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for formant-sweep operations
pub type Result<T> = std::result::Result<T, FormantSweepError>;

impl FormantSweepError {
    /// Returns true if this error is recoverable (skip the segment or recording, continue the batch)
    pub fn is_recoverable(&self) -> bool {
        self.is_segment_error()
            || matches!(
                self,
                FormantSweepError::DecodeError { .. }
                    | FormantSweepError::UnsupportedFormat { .. }
                    | FormantSweepError::AnnotationError { .. }
                    | FormantSweepError::TierNotFound { .. }
            )
    }

    /// Returns true if this error only invalidates a single segment
    pub fn is_segment_error(&self) -> bool {
        matches!(
            self,
            FormantSweepError::EmptySegment { .. }
                | FormantSweepError::EstimatorInconsistency { .. }
                | FormantSweepError::EstimationError { .. }
                | FormantSweepError::SegmentTimeout { .. }
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FormantSweepError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an annotation error for a malformed TextGrid
    pub fn annotation_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FormantSweepError::AnnotationError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an empty-segment error
    pub fn empty_segment(label: impl Into<String>, reason: impl Into<String>) -> Self {
        FormantSweepError::EmptySegment {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            _ => err.to_string(),
        };
        FormantSweepError::OutputError { path, reason }
    }
}
