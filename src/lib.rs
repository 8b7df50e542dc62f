//! formant-sweep - Ceiling-robust formant measurement
//!
//! A command-line utility for batch formant measurement of labelled speech.
//! Every frame is analysed at a whole range of spectral ceilings, and for each
//! formant the value on the most stable stretch of that range is kept.
//! Outputs one tab-separated table (and optionally JSON) per recording.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: Recording scanning and TextGrid pairing
//! - `audio`: Audio decoding (symphonia, hound) and resampling (rubato)
//! - `annotation`: TextGrid reading and interval segmentation
//! - `analysis`: Estimator backends, ceiling sweep, stability selection, aggregation
//! - `pipeline`: Per-recording, per-segment parallel orchestration
//! - `export`: Tab-separated and JSON output
//!
//! # Example
//!
//! ```no_run
//! use formant_sweep::{config::Settings, pipeline};
//!
//! let settings = Settings::default();
//! let result = pipeline::run(&settings).expect("Analysis failed");
//! println!("Wrote {} rows", result.rows_written);
//! ```

pub mod analysis;
pub mod annotation;
pub mod audio;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use error::{FormantSweepError, Result};
pub use types::{AudioBuffer, CeilingSeries, Interval, ResultRow, ResultTable, Segment};
