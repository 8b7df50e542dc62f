//! Tab-separated result table

use crate::error::Result;
use crate::export::write_atomically;
use crate::types::{ResultRow, ResultTable, RESONANCE_COUNT};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Printed in place of an undefined frequency
pub const UNDEFINED: &str = "--undefined--";

/// Column header line (without newline)
pub fn header(labelled: bool) -> String {
    let mut columns: Vec<String> = Vec::with_capacity(RESONANCE_COUNT + 2);
    if labelled {
        columns.push("label".to_string());
    }
    columns.push("time".to_string());
    columns.extend((1..=RESONANCE_COUNT).map(|r| format!("f{}", r)));
    columns.join("\t")
}

/// One data line (without newline)
pub fn format_row(row: &ResultRow, labelled: bool) -> String {
    let mut fields: Vec<String> = Vec::with_capacity(RESONANCE_COUNT + 2);
    if labelled {
        fields.push(sanitize_label(row.label.as_deref().unwrap_or_default()));
    }
    fields.push(format!("{:.6}", row.time));
    fields.extend(row.formants.iter().map(|&f| format_frequency(f)));
    fields.join("\t")
}

fn format_frequency(value: f64) -> String {
    if value.is_finite() {
        format!("{:.3}", value)
    } else {
        UNDEFINED.to_string()
    }
}

fn sanitize_label(label: &str) -> String {
    label.replace(['\t', '\n', '\r'], " ")
}

/// Write a table to `path` atomically.
///
/// `labelled` selects the label column; whole-recording tables have none.
pub fn write_table(table: &ResultTable, labelled: bool, path: &Path) -> Result<()> {
    write_atomically(path, |writer| {
        writeln!(writer, "{}", header(labelled))?;
        for row in &table.rows {
            writeln!(writer, "{}", format_row(row, labelled))?;
        }
        Ok(())
    })?;

    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}
