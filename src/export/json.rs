//! JSON export for interoperability with other tools

use crate::analysis::SweepConfig;
use crate::error::Result;
use crate::export::write_atomically;
use crate::types::{ResultRow, ResultTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct FormantJson {
    /// Schema version for forward compatibility
    pub version: String,
    /// Analysis metadata
    pub metadata: ExportMetadata,
    /// One entry per analysed frame, in table order
    pub rows: Vec<RowJson>,
}

/// Export metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// formant-sweep version that generated this file
    pub generator_version: String,
    /// Timestamp of export
    pub exported_at: String,
    /// Source recording
    pub recording: String,
    /// Number of rows
    pub row_count: usize,
    pub sweep: SweepJson,
}

/// Settings the rows were measured with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepJson {
    pub estimator: String,
    pub ceiling_low_hz: f64,
    pub ceiling_high_hz: f64,
    pub ceiling_step_hz: f64,
    pub ceiling_count: usize,
    pub frame_step_s: f64,
    pub window_s: f64,
    pub preemphasis_hz: f64,
}

impl SweepJson {
    pub fn new(config: &SweepConfig, estimator: &str) -> Self {
        Self {
            estimator: estimator.to_string(),
            ceiling_low_hz: config.ceilings.low_hz(),
            ceiling_high_hz: config.ceilings.high_hz(),
            ceiling_step_hz: config.ceilings.step_hz(),
            ceiling_count: config.ceilings.len(),
            frame_step_s: config.params.frame_step_s,
            window_s: config.params.window_s,
            preemphasis_hz: config.params.preemphasis_hz,
        }
    }
}

/// JSON representation of a result row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub time: f64,
    /// F1..F5; `null` where undefined
    pub formants: Vec<Option<f64>>,
}

impl From<&ResultRow> for RowJson {
    fn from(row: &ResultRow) -> Self {
        Self {
            label: row.label.clone(),
            time: row.time,
            formants: row
                .formants
                .iter()
                .map(|&f| f.is_finite().then_some(f))
                .collect(),
        }
    }
}

/// Write a recording's table to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
pub fn write_json(
    table: &ResultTable,
    recording: &Path,
    sweep: SweepJson,
    output_path: &Path,
) -> Result<()> {
    let output = FormantJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ExportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            recording: recording.to_string_lossy().to_string(),
            row_count: table.len(),
            sweep,
        },
        rows: table.rows.iter().map(RowJson::from).collect(),
    };

    write_atomically(output_path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        Ok(())
    })?;

    info!("Wrote {} rows to {}", table.len(), output_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EstimatorParams;
    use crate::types::CeilingSeries;
    use tempfile::TempDir;

    fn sweep() -> SweepJson {
        let config = SweepConfig {
            ceilings: CeilingSeries::new(3500.0, 6000.0, 50.0).unwrap(),
            params: EstimatorParams::default(),
            timeout: None,
        };
        SweepJson::new(&config, "burg")
    }

    #[test]
    fn test_undefined_becomes_null() {
        let row = ResultRow {
            label: None,
            time: 0.5,
            formants: [500.0, f64::NAN, 2500.0, 3500.0, 4500.0],
        };
        let json = serde_json::to_value(RowJson::from(&row)).unwrap();
        assert!(json.get("label").is_none());
        assert_eq!(json["formants"][0], 500.0);
        assert!(json["formants"][1].is_null());
    }

    #[test]
    fn test_sweep_settings() {
        let s = sweep();
        assert_eq!(s.ceiling_count, 51);
        assert_eq!(s.ceiling_high_hz, 6000.0);
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s1.formants.json");
        let table = ResultTable {
            rows: vec![ResultRow {
                label: Some("a".to_string()),
                time: 1.25,
                formants: [700.0, 1200.0, 2600.0, 3400.0, f64::NAN],
            }],
        };
        write_json(&table, Path::new("corpus/s1.wav"), sweep(), &path).unwrap();

        let parsed: FormantJson =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.version, SCHEMA_VERSION);
        assert_eq!(parsed.metadata.row_count, 1);
        assert_eq!(parsed.metadata.sweep.estimator, "burg");
        assert_eq!(parsed.rows[0].label.as_deref(), Some("a"));
        assert_eq!(parsed.rows[0].formants[4], None);
    }
}
