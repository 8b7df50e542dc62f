//! Formant analysis modules
//!
//! This module provides the estimator trait, the Burg LPC backend, and the
//! three analysis stages applied to every segment: ceiling sweep, stability
//! selection, and aggregation into result rows.
//! The trait abstraction allows swapping backends without changing pipeline code.

pub mod aggregate;
pub mod burg;
pub mod lpc;
pub mod stability;
pub mod sweep;
pub mod traits;

pub use traits::{EstimatorParams, FormantEstimator};

pub use aggregate::aggregate;
pub use burg::BurgEstimator;
pub use stability::{select, select_all};
pub use sweep::{sample, CeilingSweep, SweepConfig};
