//! Export modules for the tab-separated table and JSON

pub mod json;
pub mod table;

pub use json::{write_json, SweepJson};
pub use table::write_table;

use crate::error::{FormantSweepError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output file names for a recording's output name (which may include
/// subdirectories)
pub fn table_path(output_dir: &Path, name: &Path) -> PathBuf {
    with_suffix(output_dir.join(name), ".formants.tsv")
}

pub fn json_path(output_dir: &Path, name: &Path) -> PathBuf {
    with_suffix(output_dir.join(name), ".formants.json")
}

// Appended rather than set with `with_extension`, so dotted stems survive
fn with_suffix(path: PathBuf, suffix: &str) -> PathBuf {
    let mut name = path.into_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write through a temp file in the same directory, then rename over `path`.
///
/// Either the complete file appears or the target is left untouched.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let file = File::create(&temp_path).map_err(|e| FormantSweepError::output_error(path, e))?;
    let mut writer = BufWriter::new(file);

    let written = write(&mut writer).and_then(|_| writer.flush());
    if let Err(e) = written {
        // Clean up temp file on error
        let _ = std::fs::remove_file(&temp_path);
        return Err(FormantSweepError::output_error(path, e));
    }
    drop(writer);

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        FormantSweepError::OutputError {
            path: path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_names() {
        let dir = Path::new("out");
        assert_eq!(table_path(dir, Path::new("s1")), Path::new("out/s1.formants.tsv"));
        assert_eq!(json_path(dir, Path::new("s1")), Path::new("out/s1.formants.json"));
        assert_eq!(
            table_path(dir, Path::new("spk1/take.2")),
            Path::new("out/spk1/take.2.formants.tsv")
        );
    }

    #[test]
    fn test_failed_write_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keep.tsv");
        std::fs::write(&path, "old").unwrap();

        let result = write_atomically(&path, |w| {
            w.write_all(b"partial")?;
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
        });

        assert!(matches!(result, Err(FormantSweepError::OutputError { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory_is_output_error() {
        let result = write_atomically(Path::new("/nonexistent/dir/x.tsv"), |_| Ok(()));
        assert!(matches!(result, Err(FormantSweepError::OutputError { .. })));
    }
}
