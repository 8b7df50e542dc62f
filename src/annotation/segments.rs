//! Cutting recordings into analysis segments

use crate::error::{FormantSweepError, Result};
use crate::types::{AudioBuffer, Interval, Segment};

/// Intervals that carry a label, in tier order. Blank labels are dropped.
pub fn labelled(intervals: &[Interval]) -> Vec<Interval> {
    intervals
        .iter()
        .filter(|i| !i.label.trim().is_empty())
        .map(|i| Interval {
            label: i.label.trim().to_string(),
            start: i.start,
            end: i.end,
        })
        .collect()
}

/// Cut one interval out of the recording, padded by `padding_s` on each side
/// and clamped to the recording. Time stamps stay those of the recording.
pub fn cut(audio: &AudioBuffer, interval: &Interval, padding_s: f64) -> Result<Segment> {
    if interval.start.is_nan() || interval.end.is_nan() || interval.end <= interval.start {
        return Err(FormantSweepError::empty_segment(
            &interval.label,
            format!("interval {:.3}-{:.3}s has no duration", interval.start, interval.end),
        ));
    }

    let padded = audio
        .extract(interval.start - padding_s, interval.end + padding_s)
        .ok_or_else(|| {
            FormantSweepError::empty_segment(
                &interval.label,
                format!(
                    "interval {:.3}-{:.3}s lies outside the recording (0-{:.3}s)",
                    interval.start,
                    interval.end,
                    audio.end_time()
                ),
            )
        })?;

    Ok(Segment::new(Some(interval.label.clone()), padded))
}

/// Segments for every labelled interval, in tier order
pub fn cut_all(audio: &AudioBuffer, intervals: &[Interval], padding_s: f64) -> Vec<Result<Segment>> {
    labelled(intervals)
        .iter()
        .map(|interval| cut(audio, interval, padding_s))
        .collect()
}

/// The whole recording as a single unlabeled segment
pub fn whole(audio: AudioBuffer) -> Result<Segment> {
    if audio.is_empty() {
        return Err(FormantSweepError::empty_segment(
            "whole recording",
            "recording has no samples",
        ));
    }
    Ok(Segment::new(None, audio))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(label: &str, start: f64, end: f64) -> Interval {
        Interval {
            label: label.to_string(),
            start,
            end,
        }
    }

    fn recording() -> AudioBuffer {
        // 2 seconds at 1 kHz
        AudioBuffer::new((0..2000).map(|i| i as f64).collect(), 1000)
    }

    #[test]
    fn test_blank_labels_are_dropped() {
        let kept = labelled(&[
            interval("", 0.0, 0.5),
            interval(" a ", 0.5, 1.0),
            interval("  \t", 1.0, 1.2),
            interval("i", 1.2, 2.0),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].label, "a");
        assert_eq!(kept[1].label, "i");
    }

    #[test]
    fn test_cut_pads_and_keeps_time() {
        let segment = cut(&recording(), &interval("a", 0.5, 1.0), 0.025).unwrap();
        assert_eq!(segment.label.as_deref(), Some("a"));
        assert!((segment.audio.start_time - 0.475).abs() < 1e-9);
        assert_eq!(segment.audio.len(), 550);
        assert_eq!(segment.audio.samples[0], 475.0);
    }

    #[test]
    fn test_cut_clamps_to_recording() {
        let first = cut(&recording(), &interval("a", 0.0, 0.1), 0.025).unwrap();
        assert_eq!(first.audio.start_time, 0.0);
        assert_eq!(first.audio.len(), 125);

        let last = cut(&recording(), &interval("b", 1.9, 2.0), 0.025).unwrap();
        assert!((last.audio.end_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_interval_is_empty_segment() {
        let err = cut(&recording(), &interval("a", 1.0, 1.0), 0.025).unwrap_err();
        assert!(matches!(err, FormantSweepError::EmptySegment { .. }));
    }

    #[test]
    fn test_interval_outside_recording() {
        let err = cut(&recording(), &interval("late", 5.0, 6.0), 0.025).unwrap_err();
        assert!(err.is_segment_error());
    }

    #[test]
    fn test_cut_all_keeps_tier_order() {
        let segments = cut_all(
            &recording(),
            &[interval("o", 1.0, 1.5), interval("", 0.0, 1.0), interval("u", 0.2, 0.4)],
            0.0,
        );
        let labels: Vec<_> = segments
            .iter()
            .map(|s| s.as_ref().unwrap().label.clone().unwrap())
            .collect();
        assert_eq!(labels, vec!["o", "u"]);
    }

    #[test]
    fn test_whole_recording() {
        let segment = whole(recording()).unwrap();
        assert!(segment.label.is_none());
        assert!(whole(AudioBuffer::new(Vec::new(), 1000)).is_err());
    }
}
