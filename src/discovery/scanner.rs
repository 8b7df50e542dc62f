//! Recording discovery and annotation pairing

use crate::error::{FormantSweepError, Result};
use crate::types::AudioFormat;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extension of Praat annotation files (matched case-insensitively)
const ANNOTATION_EXTENSION: &str = "textgrid";

/// A recording found on disk, with its annotation when one sits beside it
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredRecording {
    pub audio: PathBuf,
    pub annotation: Option<PathBuf>,
    /// Output name relative to the output directory: the recording's
    /// directory below the input root, then its file stem
    pub name: PathBuf,
}

/// Scan a path (file or directory) for recordings, sorted by path
pub fn scan(input: &Path, recursive: bool) -> Result<Vec<DiscoveredRecording>> {
    if !input.exists() {
        return Err(FormantSweepError::FileNotFound(input.to_path_buf()));
    }

    let mut recordings = Vec::new();

    if input.is_file() {
        // Single file mode
        match try_discover(input, input.parent().unwrap_or(Path::new(""))) {
            Some(recording) => recordings.push(recording),
            None => {
                return Err(FormantSweepError::UnsupportedFormat {
                    path: input.to_path_buf(),
                    format: input
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                });
            }
        }
    } else if input.is_dir() {
        let walker = if recursive {
            WalkDir::new(input)
        } else {
            WalkDir::new(input).max_depth(1)
        };

        for entry in walker.sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() {
                if let Some(recording) = try_discover(path, input) {
                    debug!(
                        "Discovered: {} (annotation: {})",
                        recording.audio.display(),
                        recording
                            .annotation
                            .as_deref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "none".to_string())
                    );
                    recordings.push(recording);
                }
            }
        }
    }

    recordings.sort_by(|a, b| a.audio.cmp(&b.audio));
    check_unique_names(&recordings)?;

    info!("Discovered {} recordings", recordings.len());

    if recordings.is_empty() {
        warn!("No supported audio files found in {}", input.display());
    }

    Ok(recordings)
}

fn try_discover(path: &Path, root: &Path) -> Option<DiscoveredRecording> {
    let ext = path.extension()?.to_str()?;
    AudioFormat::from_extension(ext)?;

    Some(DiscoveredRecording {
        audio: path.to_path_buf(),
        annotation: find_annotation(path),
        name: output_name(path, root),
    })
}

/// `<dir below root>/<stem>`; recordings in the root get just their stem
fn output_name(path: &Path, root: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_else(|| OsStr::new("recording"));
    match path.strip_prefix(root).ok().and_then(Path::parent) {
        Some(dir) => dir.join(stem),
        None => PathBuf::from(stem),
    }
}

/// Two recordings may not write the same outputs, e.g. `take1.wav` and
/// `take1.flac` in one directory
fn check_unique_names(recordings: &[DiscoveredRecording]) -> Result<()> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for recording in recordings {
        if let Some(first) = seen.insert(&recording.name, &recording.audio) {
            return Err(FormantSweepError::ConfigError(format!(
                "'{}' and '{}' would write the same results ({})\n  Tip: Rename one of them or analyse them separately",
                first.display(),
                recording.audio.display(),
                recording.name.display()
            )));
        }
    }
    Ok(())
}

/// Sibling `<stem>.TextGrid`, whatever the case of the extension
pub fn find_annotation(audio: &Path) -> Option<PathBuf> {
    let stem = audio.file_stem()?;
    let dir = match audio.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut name = stem.to_os_string();
    name.push(".TextGrid");
    let exact = dir.join(name);
    if exact.is_file() {
        return Some(exact);
    }

    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_stem() == Some(stem)
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(ANNOTATION_EXTENSION))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_scan_sorted_and_paired() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.wav"));
        touch(&dir.path().join("a.flac"));
        touch(&dir.path().join("a.TextGrid"));
        touch(&dir.path().join("notes.txt"));

        let found = scan(dir.path(), true).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, Path::new("a"));
        assert_eq!(found[0].annotation, Some(dir.path().join("a.TextGrid")));
        assert_eq!(found[1].name, Path::new("b"));
        assert!(found[1].annotation.is_none());
    }

    #[test]
    fn test_annotation_extension_case() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("s01.wav");
        touch(&audio);
        touch(&dir.path().join("s01.textgrid"));
        assert_eq!(find_annotation(&audio), Some(dir.path().join("s01.textgrid")));
    }

    #[test]
    fn test_non_recursive_scan() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("top.wav"));
        touch(&dir.path().join("nested/deep.wav"));

        assert_eq!(scan(dir.path(), false).unwrap().len(), 1);
        assert_eq!(scan(dir.path(), true).unwrap().len(), 2);
    }

    #[test]
    fn test_single_file_input() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("one.ogg");
        touch(&audio);
        let found = scan(&audio, true).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, Path::new("one"));

        let text = dir.path().join("one.txt");
        touch(&text);
        assert!(matches!(
            scan(&text, true).unwrap_err(),
            FormantSweepError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn test_nested_recordings_keep_their_directory() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("spk1/take1.wav"));
        touch(&dir.path().join("spk2/take1.wav"));
        touch(&dir.path().join("top.wav"));

        let found = scan(dir.path(), true).unwrap();
        let names: Vec<&Path> = found.iter().map(|r| r.name.as_path()).collect();
        assert_eq!(
            names,
            vec![Path::new("spk1/take1"), Path::new("spk2/take1"), Path::new("top")]
        );
    }

    #[test]
    fn test_same_stem_in_one_directory_rejected() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("take1.wav"));
        touch(&dir.path().join("take1.flac"));

        assert!(matches!(
            scan(dir.path(), true).unwrap_err(),
            FormantSweepError::ConfigError(_)
        ));
    }

    #[test]
    fn test_missing_input() {
        assert!(matches!(
            scan(Path::new("/nonexistent/corpus"), true).unwrap_err(),
            FormantSweepError::FileNotFound(_)
        ));
    }
}
