//! Stability-point selection
//!
//! As the ceiling rises, a misassigned formant jumps once from a wrong
//! plateau to the right one. The selector finds the largest jump between
//! neighbouring ceilings, drops everything before it, and returns the first
//! value of the quietest neighbouring pair in what is left.
//!
//! Undefined candidates (NaN) never win either search. The returned value is
//! always an element of the input; nothing is interpolated.

use crate::analysis::sweep::CeilingSweep;

/// Pick the stable estimate from a sequence ordered by increasing ceiling.
///
/// Returns NaN only for an empty or all-undefined sequence.
pub fn select(sequence: &[f64]) -> f64 {
    select_index(sequence)
        .map(|i| sequence[i])
        .unwrap_or(f64::NAN)
}

/// Index of the value [`select`] returns.
///
/// A single value is its own stability point; with two values the first one
/// wins, since both searches see exactly one difference.
pub fn select_index(sequence: &[f64]) -> Option<usize> {
    match sequence.len() {
        0 => return None,
        1 => return defined(sequence[0]).then_some(0),
        _ => {}
    }

    // Dominant transition: the pre-jump value stays, everything before it goes
    let start = extreme_step(sequence, |candidate, best| candidate > best).unwrap_or(0);
    let trimmed = &sequence[start..];

    match extreme_step(trimmed, |candidate, best| candidate < best) {
        Some(offset) => Some(start + offset),
        None => trimmed
            .iter()
            .position(|v| defined(*v))
            .map(|offset| start + offset),
    }
}

/// Reduce every (resonance, frame) sequence of a sweep to its chosen value.
///
/// Output is indexed `[resonance][frame]`.
pub fn select_all(sweep: &CeilingSweep) -> Vec<Vec<f64>> {
    sweep
        .sequences
        .iter()
        .map(|frames| frames.iter().map(|seq| select(seq)).collect())
        .collect()
}

/// Index `k` of the neighbouring pair `(k, k+1)` whose absolute difference
/// wins under `better`. Ties keep the earliest index.
fn extreme_step(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (k, pair) in values.windows(2).enumerate() {
        let diff = (pair[1] - pair[0]).abs();
        if !defined(diff) {
            continue;
        }
        match best {
            Some((_, current)) if !better(diff, current) => {}
            _ => best = Some((k, diff)),
        }
    }
    best.map(|(k, _)| k)
}

fn defined(value: f64) -> bool {
    !value.is_nan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameEstimateSequence;

    #[test]
    fn test_single_jump_selects_post_jump_plateau() {
        let seq = [100.0, 100.0, 100.0, 250.0, 251.0, 249.0, 250.0];
        assert_eq!(select(&seq), 250.0);
        assert_eq!(select_index(&seq), Some(3));
    }

    #[test]
    fn test_flat_sequence() {
        assert_eq!(select(&[300.0, 300.0, 300.0, 300.0]), 300.0);
        assert_eq!(select_index(&[300.0, 300.0, 300.0, 300.0]), Some(0));
    }

    #[test]
    fn test_degenerate_lengths_return_first_value() {
        assert_eq!(select(&[812.0]), 812.0);
        assert_eq!(select(&[812.0, 1400.0]), 812.0);
        assert_eq!(select_index(&[812.0, 1400.0]), Some(0));
    }

    #[test]
    fn test_empty_sequence_is_undefined() {
        assert!(select(&[]).is_nan());
        assert_eq!(select_index(&[]), None);
    }

    #[test]
    fn test_jump_at_last_step_keeps_pre_jump_value() {
        // Largest change between the 2nd and 3rd ceiling: the trimmed region
        // is [4800, 5100], and its only pair starts at 4800.
        assert_eq!(select(&[4800.0, 4800.0, 5100.0]), 4800.0);
    }

    #[test]
    fn test_downward_jump() {
        let seq = [3900.0, 3910.0, 3905.0, 3300.0, 3301.0, 3302.0];
        // Largest step 3905 -> 3300; quietest pair afterwards starts at 3300
        assert_eq!(select(&seq), 3300.0);
    }

    #[test]
    fn test_ties_pick_earliest_index() {
        // Two equal jumps of 100 and two equal flat pairs after the first:
        // the earliest of each wins
        let seq = [100.0, 100.0, 200.0, 200.0, 300.0, 300.0];
        assert_eq!(select_index(&seq), Some(2));
        assert_eq!(select(&seq), 200.0);
    }

    #[test]
    fn test_result_is_always_an_input_element() {
        let sequences: [&[f64]; 5] = [
            &[512.3, 530.1, 1201.7, 1198.4, 1203.9, 1190.0],
            &[2500.0, 2490.0, 2480.0, 2470.0],
            &[900.0, 1800.0, 900.0, 1800.0],
            &[1.0, 2.0, 4.0, 8.0, 16.0, 32.0],
            &[3000.0, 3000.5],
        ];
        for seq in sequences {
            let chosen = select(seq);
            assert!(seq.contains(&chosen), "{} not in {:?}", chosen, seq);
        }
    }

    #[test]
    fn test_undefined_values_are_skipped() {
        let seq = [f64::NAN, 500.0, 500.0, 700.0, 701.0];
        assert_eq!(select(&seq), 700.0);
    }

    #[test]
    fn test_all_undefined() {
        assert!(select(&[f64::NAN, f64::NAN, f64::NAN]).is_nan());
        assert!(select(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_isolated_defined_value_is_returned() {
        // No defined differences at all: fall back to the first defined value
        let seq = [f64::NAN, 640.0, f64::NAN];
        assert_eq!(select(&seq), 640.0);
    }

    #[test]
    fn test_select_all_shapes_output() {
        let sweep = CeilingSweep {
            times: vec![0.1, 0.2],
            sequences: vec![
                vec![
                    FrameEstimateSequence::new(vec![500.0, 500.0, 510.0]),
                    FrameEstimateSequence::new(vec![520.0]),
                ],
                vec![
                    FrameEstimateSequence::new(vec![1500.0, 1500.0, 1500.0]),
                    FrameEstimateSequence::new(vec![1400.0, 1700.0]),
                ],
            ],
        };
        let chosen = select_all(&sweep);
        assert_eq!(chosen, vec![vec![500.0, 520.0], vec![1500.0, 1400.0]]);
    }
}
