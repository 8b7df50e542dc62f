//! Runtime configuration settings

use crate::analysis::{EstimatorParams, SweepConfig};
use crate::error::{FormantSweepError, Result};
use crate::types::{CeilingSeries, RESONANCE_COUNT};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for the analysis pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input path (file or directory)
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Baseline (lowest) ceiling in Hz
    pub ceiling_low_hz: f64,
    /// Highest ceiling in Hz
    pub ceiling_high_hz: f64,
    /// Ceiling increment in Hz
    pub ceiling_step_hz: f64,
    /// Time between frames in seconds
    pub frame_step_s: f64,
    /// Analysis window length in seconds
    pub window_s: f64,
    /// Pre-emphasis frequency in Hz
    pub preemphasis_hz: f64,
    /// Padding around each interval in seconds
    pub padding_s: f64,
    /// Annotation tier (1-based)
    pub tier_index: usize,
    /// Analyse whole recordings, ignoring annotations
    pub whole_file: bool,
    /// Per-segment timeout
    pub segment_timeout: Option<Duration>,
    /// Number of analysis worker threads
    pub analysis_threads: usize,
    /// Scan recursively
    pub recursive: bool,
    /// Overwrite existing result tables
    pub force: bool,
    /// Output JSON
    pub output_json: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - list inputs without processing
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let defaults = Self::default();

        Self {
            input: cli.input.clone(),
            output: cli.output.clone(),
            ceiling_low_hz: cli.ceiling_low,
            ceiling_high_hz: cli.ceiling_high,
            ceiling_step_hz: cli.ceiling_step,
            frame_step_s: cli.time_step,
            window_s: cli.window,
            preemphasis_hz: cli.pre_emphasis,
            padding_s: cli.padding,
            tier_index: cli.tier,
            whole_file: cli.whole_file,
            // Non-finite or negative values are kept as zero so validate() rejects them
            segment_timeout: cli
                .timeout
                .map(|s| Duration::try_from_secs_f64(s).unwrap_or(Duration::ZERO)),
            analysis_threads: cli.threads.unwrap_or(defaults.analysis_threads),
            // The last of -r / --no-recursive wins; recursion is the default
            recursive: !cli.no_recursive,
            force: cli.force,
            output_json: cli.json,
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }

    /// Check every numeric setting before any file is touched
    pub fn validate(&self) -> Result<()> {
        self.ceiling_series()?;

        if !(self.frame_step_s.is_finite() && self.frame_step_s > 0.0) {
            return Err(FormantSweepError::ConfigError(format!(
                "time step must be positive (got {} s)",
                self.frame_step_s
            )));
        }
        if !(self.window_s.is_finite() && self.window_s > 0.0) {
            return Err(FormantSweepError::ConfigError(format!(
                "window length must be positive (got {} s)",
                self.window_s
            )));
        }
        if !(self.preemphasis_hz.is_finite() && self.preemphasis_hz >= 0.0) {
            return Err(FormantSweepError::ConfigError(format!(
                "pre-emphasis frequency must not be negative (got {} Hz)",
                self.preemphasis_hz
            )));
        }
        if !(self.padding_s.is_finite() && self.padding_s >= 0.0) {
            return Err(FormantSweepError::ConfigError(format!(
                "padding must not be negative (got {} s)",
                self.padding_s
            )));
        }
        if self.tier_index == 0 {
            return Err(FormantSweepError::ConfigError(
                "tiers are numbered from 1".to_string(),
            ));
        }
        if self.analysis_threads == 0 {
            return Err(FormantSweepError::ConfigError(
                "at least one worker thread is required".to_string(),
            ));
        }
        if self.segment_timeout == Some(Duration::ZERO) {
            return Err(FormantSweepError::ConfigError(
                "timeout must be a positive number of seconds".to_string(),
            ));
        }

        Ok(())
    }

    /// Ceiling values to sweep
    pub fn ceiling_series(&self) -> Result<CeilingSeries> {
        CeilingSeries::new(self.ceiling_low_hz, self.ceiling_high_hz, self.ceiling_step_hz)
    }

    /// Sweep configuration handed to every segment
    pub fn sweep_config(&self) -> Result<SweepConfig> {
        Ok(SweepConfig {
            ceilings: self.ceiling_series()?,
            params: EstimatorParams {
                order: RESONANCE_COUNT,
                window_s: self.window_s,
                preemphasis_hz: self.preemphasis_hz,
                frame_step_s: self.frame_step_s,
            },
            timeout: self.segment_timeout,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("./output"),
            ceiling_low_hz: 3500.0,
            ceiling_high_hz: 6000.0,
            ceiling_step_hz: 50.0,
            frame_step_s: 0.005,
            window_s: 0.025,
            preemphasis_hz: 50.0,
            padding_s: 0.025,
            tier_index: 1,
            whole_file: false,
            segment_timeout: None,
            analysis_threads: num_cpus::get().saturating_sub(1).max(1),
            recursive: true,
            force: false,
            output_json: false,
            show_progress: true,
            dry_run: false,
        }
    }
}
