//! Audio input: decoding and sample-rate conversion

pub mod decoder;
pub mod resample;

pub use decoder::decode;
