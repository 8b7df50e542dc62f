//! formant-sweep CLI entry point

use clap::Parser;
use formant_sweep::config::{Cli, Settings};
use formant_sweep::pipeline::{self, PipelineResult};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let settings = Settings::from_cli(&cli);

    // Reject bad paths and settings before anything is scanned or written
    let checked = check_paths(&cli.input, &cli.output)
        .and_then(|()| settings.validate().map_err(|e| e.to_string()));
    if let Err(message) = checked {
        eprintln!("Error: {}", message);
        return ExitCode::FAILURE;
    }

    match pipeline::run(&settings) {
        Ok(result) => {
            if !settings.dry_run {
                print_summary(&result);
            }
            if result.recordings_failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();
}

fn print_summary(result: &PipelineResult) {
    println!();
    println!(
        "Recordings: {} analysed, {} failed, {} skipped (of {} found)",
        result.recordings_analysed,
        result.recordings_failed,
        result.recordings_skipped,
        result.recordings_found
    );
    println!(
        "Segments:   {} analysed, {} failed; {} rows written",
        result.segments_analysed, result.segments_failed, result.rows_written
    );
}

fn check_paths(input: &Path, output: &Path) -> Result<(), String> {
    if !input.exists() {
        return Err(format!(
            "Input path does not exist: {}\n\n  Tip: Pass a recording or a directory of recordings.\n  Examples:\n    formant-sweep -i ~/corpus -o ./formants\n    formant-sweep -i ./speaker1.wav -o ./formants",
            input.display()
        ));
    }

    // The output directory itself is created on demand, its parent is not
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => Err(format!(
            "Output parent directory does not exist: {}\n\n  Tip: mkdir -p {}",
            parent.display(),
            parent.display()
        )),
        _ => Ok(()),
    }
}
