//! Interval annotations and segmentation
//!
//! Reads the interval tier of a Praat TextGrid and cuts the recording into
//! one padded segment per labelled interval.

pub mod segments;
pub mod textgrid;

pub use segments::{cut, cut_all, labelled, whole};
pub use textgrid::{read_textgrid, TextGrid};
