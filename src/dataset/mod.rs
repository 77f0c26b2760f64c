//! Dataset module for time-aware feature scaling
//! Provides date parsing, expanding statistics and the scaler itself

pub mod processor;
pub mod statistics;
pub mod utility;

pub use processor::{fit_transform, transform, ExpandingDateScaler, ScaledFrame};
pub use statistics::{ExpandingStats, Snapshot, StatisticsBundle, STD_EPSILON};
pub use utility::{date_keys, DateKey, FeatureMatrix};
