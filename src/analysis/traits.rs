//! Formant estimator abstraction
//!
//! The sweep only needs per-frame candidate frequencies for a given ceiling;
//! any spectral method can sit behind this trait. The bundled backend is
//! Burg LPC (see `burg.rs`).

use crate::error::Result;
use crate::types::{AudioBuffer, EstimatorFrame};

/// Analysis parameters that stay fixed across a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorParams {
    /// Maximum number of candidates per frame
    pub order: usize,
    /// Analysis window length in seconds
    pub window_s: f64,
    /// Pre-emphasis from this frequency (Hz)
    pub preemphasis_hz: f64,
    /// Time between frame centres in seconds
    pub frame_step_s: f64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            order: 5,
            window_s: 0.025,
            preemphasis_hz: 50.0,
            frame_step_s: 0.005,
        }
    }
}

/// Formant estimation backend
///
/// Implementations must be deterministic and must return the same frame
/// grid (count and times) for a given audio buffer whatever the ceiling.
pub trait FormantEstimator: Send + Sync {
    /// Estimate candidate frequencies per frame with resonances assumed below `ceiling_hz`
    fn estimate(
        &self,
        audio: &AudioBuffer,
        ceiling_hz: f64,
        params: &EstimatorParams,
    ) -> Result<Vec<EstimatorFrame>>;

    /// Get the name of this estimator (for logging)
    fn name(&self) -> &'static str;
}
