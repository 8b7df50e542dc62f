//! Input discovery: recordings and their annotations

pub mod scanner;

pub use scanner::{scan, DiscoveredRecording};
