//! Expanding per-feature statistics and the fitted statistics bundle.

use serde::{Deserialize, Serialize};

use super::utility::DateKey;
use crate::error::{Result, ScalerError};

/// Replacement for a zero standard deviation.
pub const STD_EPSILON: f64 = 1e-8;

/// Running mean and population variance for every feature column.
///
/// Rows are folded in with Welford's update, so a constant feature keeps a
/// sum of squared deviations of exactly zero.
#[derive(Debug, Clone)]
pub struct ExpandingStats {
    count: usize,
    mean: Vec<f64>,
    m2: Vec<f64>,
}

impl ExpandingStats {
    pub fn new(width: usize) -> Self {
        Self {
            count: 0,
            mean: vec![0.0; width],
            m2: vec![0.0; width],
        }
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Fold one row of feature values in. `date` only labels the error.
    pub fn push_row(&mut self, date: &DateKey, values: &[f64]) -> Result<()> {
        if values.len() != self.width() {
            return Err(ScalerError::FeatureShapeMismatch {
                date: date.to_string(),
                expected: self.width(),
                actual: values.len(),
            });
        }

        self.count += 1;
        let n = self.count as f64;
        for ((mean, m2), &x) in self.mean.iter_mut().zip(self.m2.iter_mut()).zip(values) {
            let delta = x - *mean;
            *mean += delta / n;
            *m2 += delta * (x - *mean);
        }
        Ok(())
    }

    /// Snapshot of the statistics over every row pushed so far.
    pub fn snapshot(&self, date: DateKey) -> Snapshot {
        let n = self.count as f64;
        let stds = self
            .m2
            .iter()
            .map(|&m2| {
                let std = (m2 / n).sqrt();
                if std == 0.0 {
                    STD_EPSILON
                } else {
                    std
                }
            })
            .collect();

        Snapshot {
            date,
            means: self.mean.clone(),
            stds,
        }
    }
}

/// Means and standard deviations fitted at one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: DateKey,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl Snapshot {
    #[inline]
    pub fn scale(&self, feature: usize, value: f64) -> f64 {
        (value - self.means[feature]) / self.stds[feature]
    }

    #[inline]
    pub fn unscale(&self, feature: usize, value: f64) -> f64 {
        value * self.stds[feature] + self.means[feature]
    }
}

/// Everything a fit call learned, reusable by any number of apply calls.
///
/// Snapshots are kept sorted by date, which doubles as the sorted sequence
/// of fitted dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBundle {
    feature_columns: Vec<String>,
    snapshots: Vec<Snapshot>,
    date_column: String,
    min_periods: usize,
}

impl StatisticsBundle {
    pub(crate) fn new(
        feature_columns: Vec<String>,
        snapshots: Vec<Snapshot>,
        date_column: String,
        min_periods: usize,
    ) -> Self {
        Self {
            feature_columns,
            snapshots,
            date_column,
            min_periods,
        }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn min_periods(&self) -> usize {
        self.min_periods
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Fitted dates in ascending order.
    pub fn fitted_dates(&self) -> impl Iterator<Item = &DateKey> + '_ {
        self.snapshots.iter().map(|s| &s.date)
    }

    /// Snapshot fitted exactly at `date`.
    pub fn snapshot(&self, date: &DateKey) -> Option<&Snapshot> {
        self.snapshots
            .binary_search_by(|s| s.date.cmp(date))
            .ok()
            .map(|i| &self.snapshots[i])
    }

    /// Most recent snapshot fitted at or before `date`.
    pub fn snapshot_asof(&self, date: &DateKey) -> Option<&Snapshot> {
        let pos = self.snapshots.partition_point(|s| s.date <= *date);
        pos.checked_sub(1).map(|i| &self.snapshots[i])
    }

    pub fn means(&self, date: &DateKey) -> Option<&[f64]> {
        self.snapshot(date).map(|s| s.means.as_slice())
    }

    pub fn stds(&self, date: &DateKey) -> Option<&[f64]> {
        self.snapshot(date).map(|s| s.stds.as_slice())
    }

    /// Kind of the fitted date keys, if anything was fitted.
    pub fn date_kind(&self) -> Option<&'static str> {
        self.snapshots.first().map(|s| s.date.kind())
    }

    /// Check a bundle that may have come from outside the process.
    pub fn validate(&self) -> Result<()> {
        let width = self.feature_columns.len();

        for (i, name) in self.feature_columns.iter().enumerate() {
            if self.feature_columns[..i].contains(name) {
                return Err(ScalerError::ColumnCollision(name.clone()));
            }
        }

        for snapshot in &self.snapshots {
            for len in [snapshot.means.len(), snapshot.stds.len()] {
                if len != width {
                    return Err(ScalerError::FeatureShapeMismatch {
                        date: snapshot.date.to_string(),
                        expected: width,
                        actual: len,
                    });
                }
            }
        }

        for pair in self.snapshots.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(ScalerError::CorruptStatistics(format!(
                    "fitted dates out of order at {}",
                    pair[1].date
                )));
            }
            if pair[0].date.kind() != pair[1].date.kind() {
                return Err(ScalerError::CorruptStatistics(format!(
                    "mixed date kinds {} and {}",
                    pair[0].date.kind(),
                    pair[1].date.kind()
                )));
            }
        }

        Ok(())
    }
}
