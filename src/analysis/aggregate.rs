//! Frame aggregation: chosen estimates → result rows

use crate::types::{ResultRow, RESONANCE_COUNT};

/// Pack chosen values (`chosen[resonance][frame]`) into one row per frame.
///
/// Frame order is preserved. Resonances beyond those supplied are undefined.
pub fn aggregate(label: Option<&str>, times: &[f64], chosen: &[Vec<f64>]) -> Vec<ResultRow> {
    times
        .iter()
        .enumerate()
        .map(|(frame, &time)| {
            let mut formants = [f64::NAN; RESONANCE_COUNT];
            for (slot, per_frame) in formants.iter_mut().zip(chosen) {
                if let Some(&value) = per_frame.get(frame) {
                    *slot = value;
                }
            }
            ResultRow {
                label: label.map(str::to_string),
                time,
                formants,
            }
        })
        .collect()
}
