//! Expanding Scaler - leakage-safe, time-aware feature normalization
//!
//! This crate standardizes numeric feature columns of a polars `DataFrame`
//! with expanding per-date z-scores:
//!
//! - Fit mode computes, for every unique date, the mean and population
//!   standard deviation over all rows dated on or before it
//! - Apply mode reuses those statistics on new data through a backward
//!   as-of lookup, never recomputing anything
//! - Statistics are returned as an immutable, serde-serializable bundle
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use expanding_scaler::{fit_transform, transform};
//! use polars::prelude::*;
//!
//! let train = df!("date" => [1i64, 1, 2], "f" => [10.0, 20.0, 30.0]).unwrap();
//! let (scaled, stats) = fit_transform(&train, "date", &[], 0).unwrap();
//!
//! let live = df!("date" => [3i64], "f" => [25.0]).unwrap();
//! let live_scaled = transform(&live, "date", &stats, &[]).unwrap();
//! ```

pub mod dataset;
pub mod error;
pub mod logger;
pub mod setting;

// Re-export commonly used types
pub use dataset::{
    fit_transform, transform, DateKey, ExpandingDateScaler, ScaledFrame, Snapshot, StatisticsBundle, STD_EPSILON,
};
pub use error::{Result, ScalerError};
pub use logger::{init_logger, Logger};
pub use setting::{ScalerSetting, SettingValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
