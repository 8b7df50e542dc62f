//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// formant-sweep - ceiling-robust formant measurement
///
/// Runs a formant estimator across a range of analysis ceilings and keeps,
/// per frame and per formant, the value that stays stable across the range.
/// Reads labelled intervals from Praat TextGrids next to each recording and
/// writes one tab-separated table per recording.
#[derive(Parser, Debug)]
#[command(name = "formant-sweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Input path (audio file or directory)
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for result tables
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Lowest (baseline) formant ceiling in Hz
    #[arg(long, value_name = "HZ", default_value_t = 3500.0)]
    pub ceiling_low: f64,

    /// Highest formant ceiling in Hz (a whole number of steps above the lowest)
    #[arg(long, value_name = "HZ", default_value_t = 6000.0)]
    pub ceiling_high: f64,

    /// Ceiling increment in Hz
    #[arg(long, value_name = "HZ", default_value_t = 50.0)]
    pub ceiling_step: f64,

    /// Time between analysis frames in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.005)]
    pub time_step: f64,

    /// Analysis window length in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.025)]
    pub window: f64,

    /// Pre-emphasis from this frequency (Hz)
    #[arg(long, value_name = "HZ", default_value_t = 50.0)]
    pub pre_emphasis: f64,

    /// Padding added on both sides of every interval (seconds)
    #[arg(long, value_name = "SECONDS", default_value_t = 0.025)]
    pub padding: f64,

    /// Annotation tier to read intervals from (1-based)
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub tier: usize,

    /// Ignore TextGrids and analyse each recording as a whole
    #[arg(long, default_value = "false")]
    pub whole_file: bool,

    /// Abandon a segment after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Number of worker threads (defaults to CPU count - 1)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Scan subdirectories recursively (the default)
    #[arg(short, long, overrides_with = "no_recursive")]
    pub recursive: bool,

    /// Only scan the top level of the input directory
    #[arg(long, overrides_with = "recursive")]
    pub no_recursive: bool,

    /// Overwrite existing result tables (by default, skips analysed recordings)
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Also write a JSON copy of each result table
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - list recordings and intervals without analysing
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["formant-sweep", "-i", "in.wav", "-o", "out"]);
        assert_eq!(cli.ceiling_low, 3500.0);
        assert_eq!(cli.ceiling_high, 6000.0);
        assert_eq!(cli.ceiling_step, 50.0);
        assert_eq!(cli.time_step, 0.005);
        assert_eq!(cli.tier, 1);
        assert!(cli.timeout.is_none());
        assert_eq!(cli.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::parse_from(["formant-sweep", "-i", "a", "-o", "b", "-vv"]);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
        let cli = Cli::parse_from(["formant-sweep", "-i", "a", "-o", "b", "-v", "-q"]);
        assert_eq!(cli.log_level(), tracing::Level::ERROR);
    }
}
