//! Pipeline orchestration
//!
//! Coordinates discovery, per-recording segmentation, parallel per-segment
//! analysis, and export. Recordings are handled one after another; the
//! segments of a recording are spread over the rayon pool and collected back
//! in interval order.

use crate::analysis::{self, BurgEstimator, FormantEstimator, SweepConfig};
use crate::annotation;
use crate::audio;
use crate::config::Settings;
use crate::discovery::{self, DiscoveredRecording};
use crate::error::{FormantSweepError, Result};
use crate::export::{self, SweepJson};
use crate::types::{AudioBuffer, ResultRow, ResultTable, Segment};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Pipeline result summary
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub recordings_found: usize,
    pub recordings_analysed: usize,
    /// Existing results kept (no `--force`), or everything in a dry run
    pub recordings_skipped: usize,
    /// Recordings that could not be decoded or segmented
    pub recordings_failed: usize,
    pub segments_analysed: usize,
    pub segments_failed: usize,
    pub rows_written: usize,
}

/// Outcome of analysing one recording's segments
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Rows of successful segments, in interval order
    pub table: ResultTable,
    pub segments_analysed: usize,
    /// Per-segment errors, in interval order
    pub failures: Vec<FormantSweepError>,
}

/// Run the full analysis pipeline
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    let pipeline_start = Instant::now();

    settings.validate()?;
    let config = settings.sweep_config()?;

    configure_thread_pool(settings.analysis_threads)?;

    // Phase 1: Discovery
    let discovery_start = Instant::now();
    info!("Scanning for recordings...");
    let recordings = discovery::scan(&settings.input, settings.recursive)?;
    info!(
        "Found {} recordings in {:.2}s",
        recordings.len(),
        discovery_start.elapsed().as_secs_f64()
    );

    let mut result = PipelineResult {
        recordings_found: recordings.len(),
        ..Default::default()
    };

    if recordings.is_empty() {
        return Ok(result);
    }

    // Dry run mode - show recordings and exit
    if settings.dry_run {
        return Ok(run_dry_run(&recordings, settings));
    }

    std::fs::create_dir_all(&settings.output)
        .map_err(|e| FormantSweepError::output_error(&settings.output, e))?;

    let estimator = BurgEstimator::new();
    info!(
        "Sweeping {} ceilings ({:.0}-{:.0} Hz, step {:.0} Hz) with {}",
        config.ceilings.len(),
        config.ceilings.low_hz(),
        config.ceilings.high_hz(),
        config.ceilings.step_hz(),
        estimator.name()
    );

    // Phase 2: Analysis and export, one recording at a time
    let analysis_start = Instant::now();
    for recording in &recordings {
        let table_path = export::table_path(&settings.output, &recording.name);
        if table_path.exists() && !settings.force {
            debug!(
                "Skipping {} ({} exists, use --force to re-analyze)",
                recording.audio.display(),
                table_path.display()
            );
            result.recordings_skipped += 1;
            continue;
        }

        match process_recording(recording, settings, &estimator, &config) {
            Ok(outcome) => {
                result.recordings_analysed += 1;
                result.segments_analysed += outcome.segments_analysed;
                result.segments_failed += outcome.failures.len();
                result.rows_written += outcome.table.len();
            }
            Err(e) if e.is_recoverable() => {
                warn!("Skipping {}: {}", recording.audio.display(), e);
                result.recordings_failed += 1;
            }
            Err(e) => {
                error!("Failed {}: {}", recording.audio.display(), e);
                return Err(e);
            }
        }
    }

    if result.recordings_skipped > 0 {
        info!(
            "Skipped {} already-analysed recordings (use --force to re-analyze)",
            result.recordings_skipped
        );
    }
    info!(
        "Analysis completed in {:.2}s ({} segments, {} failed)",
        analysis_start.elapsed().as_secs_f64(),
        result.segments_analysed,
        result.segments_failed
    );
    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    if result.recordings_analysed > 0 {
        println!(
            "✓ Wrote {} rows for {} recordings to {}",
            result.rows_written,
            result.recordings_analysed,
            settings.output.display()
        );
    }

    Ok(result)
}

/// Decode, segment, analyse and export one recording
fn process_recording(
    recording: &DiscoveredRecording,
    settings: &Settings,
    estimator: &dyn FormantEstimator,
    config: &SweepConfig,
) -> Result<BatchOutcome> {
    let started = Instant::now();
    debug!("Analyzing: {}", recording.audio.display());

    let audio = audio::decode(&recording.audio)?;
    let (segments, labelled) = plan_segments(recording, audio, settings)?;

    let progress = settings
        .show_progress
        .then(|| progress_bar(segments.len(), &recording.name.display().to_string()));
    let outcome = analyze_segments(segments, estimator, config, progress.as_ref());
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    for failure in &outcome.failures {
        warn!("{}: {}", recording.audio.display(), failure);
    }

    let table_path = export::table_path(&settings.output, &recording.name);
    if let Some(dir) = table_path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| FormantSweepError::output_error(dir, e))?;
    }
    export::write_table(&outcome.table, labelled, &table_path)?;
    if settings.output_json {
        export::write_json(
            &outcome.table,
            &recording.audio,
            SweepJson::new(config, estimator.name()),
            &export::json_path(&settings.output, &recording.name),
        )?;
    }

    info!(
        "{}: {} segments, {} rows in {:.2}s",
        recording.name.display(),
        outcome.segments_analysed,
        outcome.table.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(outcome)
}

/// Segments for a recording, and whether its table carries labels
fn plan_segments(
    recording: &DiscoveredRecording,
    audio: AudioBuffer,
    settings: &Settings,
) -> Result<(Vec<Result<Segment>>, bool)> {
    match (&recording.annotation, settings.whole_file) {
        (Some(path), false) => {
            let grid = annotation::read_textgrid(path)?;
            let intervals = grid.interval_tier(settings.tier_index, path)?;
            Ok((annotation::cut_all(&audio, intervals, settings.padding_s), true))
        }
        _ => {
            debug!("{}: analysing whole recording", recording.audio.display());
            Ok((vec![annotation::whole(audio)], false))
        }
    }
}

/// Analyse every segment on the current rayon pool.
///
/// Segments that could not be cut arrive as errors and are reported
/// alongside analysis failures. Rows keep interval order.
pub fn analyze_segments(
    segments: Vec<Result<Segment>>,
    estimator: &dyn FormantEstimator,
    config: &SweepConfig,
    progress: Option<&ProgressBar>,
) -> BatchOutcome {
    let results: Vec<Result<Vec<ResultRow>>> = segments
        .into_par_iter()
        .map(|segment| {
            let rows = segment.and_then(|s| analyze_segment(&s, estimator, config));
            if let Some(pb) = progress {
                pb.inc(1);
            }
            rows
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(rows) => {
                outcome.segments_analysed += 1;
                outcome.table.append_segment(rows);
            }
            Err(e) => outcome.failures.push(e),
        }
    }
    outcome
}

/// Sweep, select and aggregate one segment
pub fn analyze_segment(
    segment: &Segment,
    estimator: &dyn FormantEstimator,
    config: &SweepConfig,
) -> Result<Vec<ResultRow>> {
    let sweep = analysis::sample(segment, estimator, config)?;
    if sweep.frame_count() == 0 {
        return Err(FormantSweepError::empty_segment(
            segment.display_label(),
            format!(
                "{:.3}s is shorter than one analysis window ({:.3}s)",
                segment.audio.duration,
                2.0 * config.params.window_s
            ),
        ));
    }

    let chosen = analysis::select_all(&sweep);
    Ok(analysis::aggregate(
        segment.label.as_deref(),
        &sweep.times,
        &chosen,
    ))
}

fn progress_bar(len: usize, name: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_message(name.to_string());
    pb
}

/// Dry run mode - list recordings and their intervals without analysing
fn run_dry_run(recordings: &[DiscoveredRecording], settings: &Settings) -> PipelineResult {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    for recording in recordings {
        let segments = match (&recording.annotation, settings.whole_file) {
            (Some(path), false) => match count_intervals(path, settings.tier_index) {
                Ok(count) => format!("{} labelled intervals", count),
                Err(e) => format!("annotation unusable: {}", e.to_string().lines().next().unwrap_or_default()),
            },
            _ => "whole recording".to_string(),
        };

        let table = export::table_path(&settings.output, &recording.name);
        let status = if table.exists() && !settings.force {
            " (exists, would skip)"
        } else {
            ""
        };
        println!("  {}: {}{}", recording.audio.display(), segments, status);
    }

    println!();
    println!(
        "Would sweep {} ceilings per frame for {} recordings into {}",
        settings
            .ceiling_series()
            .map(|c| c.len())
            .unwrap_or_default(),
        recordings.len(),
        settings.output.display()
    );
    println!();

    PipelineResult {
        recordings_found: recordings.len(),
        recordings_skipped: recordings.len(), // All "skipped" in dry run mode
        ..Default::default()
    }
}

fn count_intervals(path: &Path, tier: usize) -> Result<usize> {
    let grid = annotation::read_textgrid(path)?;
    Ok(annotation::labelled(grid.interval_tier(tier, path)?).len())
}

/// Configure the Rayon thread pool
fn configure_thread_pool(num_threads: usize) -> Result<()> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => {
            debug!("Configured thread pool with {} threads", num_threads);
        }
        Err(e) => {
            // If the pool is already initialized (e.g., in tests), that's OK
            if e.to_string().contains("already been initialized") {
                debug!("Thread pool already initialized, using existing pool");
            } else {
                return Err(FormantSweepError::ConfigError(format!(
                    "Failed to configure thread pool: {}",
                    e
                )));
            }
        }
    }
    Ok(())
}
