//! Expanding per-date z-score scaling.
//!
//! A fit call walks the unique dates in ascending order, folding each
//! date's rows into running statistics, and records a snapshot per date
//! once `min_periods` dates have been seen. Every row is scaled with the
//! snapshot of its own date, so no row is ever scaled with information
//! from a later date. An apply call reuses those snapshots on new data,
//! picking for each date the latest snapshot fitted at or before it.

use polars::prelude::*;
use rayon::prelude::*;

use super::statistics::{ExpandingStats, Snapshot, StatisticsBundle};
use super::utility::{date_keys, group_by_date, require_column, sorted_positions, DateKey, FeatureMatrix};
use crate::error::{Result, ScalerError};
use crate::logger::Logger;
use crate::setting::{ScalerSetting, DATE_COLUMN, MERGE_COLUMNS, MIN_PERIODS};

/// Scaled output of a fit or apply call.
#[derive(Debug, Clone)]
pub struct ScaledFrame {
    /// Scaled features, then the date column, then pass-through columns.
    pub frame: DataFrame,
    /// Input row position of each output row.
    pub source_rows: Vec<usize>,
}

/// Stateless expanding-window scaler keyed by a date column.
#[derive(Debug, Clone)]
pub struct ExpandingDateScaler {
    date_column: String,
    merge_columns: Vec<String>,
    min_periods: usize,
    logger: Logger,
}

impl ExpandingDateScaler {
    /// Create a scaler. Pass-through columns naming the date column are ignored.
    pub fn new(date_column: impl Into<String>, merge_columns: &[String], min_periods: usize) -> Self {
        let date_column = date_column.into();

        let mut merge: Vec<String> = Vec::with_capacity(merge_columns.len());
        for name in merge_columns {
            if *name != date_column && !merge.contains(name) {
                merge.push(name.clone());
            }
        }

        Self {
            date_column,
            merge_columns: merge,
            min_periods,
            logger: Logger::default(),
        }
    }

    pub fn from_setting(setting: &ScalerSetting) -> Self {
        let date_column = setting.get_string(DATE_COLUMN).unwrap_or_else(|| "date".to_string());
        let merge_columns = setting.get_list(MERGE_COLUMNS).unwrap_or_default();
        let min_periods = setting.get_int(MIN_PERIODS).unwrap_or(0).max(0) as usize;
        Self::new(date_column, &merge_columns, min_periods)
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn merge_columns(&self) -> &[String] {
        &self.merge_columns
    }

    pub fn min_periods(&self) -> usize {
        self.min_periods
    }

    /// Fit expanding statistics on `df` and scale it with them.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(ScaledFrame, StatisticsBundle)> {
        self.check_merge_columns(df)?;

        let feature_columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| *name != self.date_column && !self.merge_columns.contains(name))
            .collect();
        if feature_columns.is_empty() {
            return Err(ScalerError::NoFeatureColumns);
        }

        let dates = date_keys(df, &self.date_column)?;
        let matrix = FeatureMatrix::from_frame(df, &feature_columns)?;
        let sorted = sorted_positions(&dates);
        let groups = group_by_date(&dates, &sorted);

        let mut stats = ExpandingStats::new(feature_columns.len());
        let mut snapshots = Vec::with_capacity(groups.len().saturating_sub(self.min_periods));
        let mut row = Vec::with_capacity(feature_columns.len());

        for (i, (date, rows)) in groups.iter().enumerate() {
            // rows before the gate still count toward later dates
            for &r in rows {
                matrix.read_row(r, &mut row);
                stats.push_row(date, &row)?;
            }

            if i < self.min_periods || stats.is_empty() {
                continue;
            }
            snapshots.push(stats.snapshot(date.clone()));
        }

        let bundle = StatisticsBundle::new(
            feature_columns,
            snapshots,
            self.date_column.clone(),
            self.min_periods,
        );
        tracing::debug!(
            rows = df.height(),
            unique_dates = groups.len(),
            fitted_dates = bundle.len(),
            "expanding statistics fitted"
        );

        let (scaled, unmatched) = scale_groups(&matrix, &groups, |date| bundle.snapshot(date));
        self.report_unmatched(unmatched);
        let frame = self.assemble(df, bundle.feature_columns(), &sorted, scaled)?;

        self.logger.info(&format!(
            "Fitted {} of {} dates, kept {} of {} rows",
            bundle.len(),
            groups.len(),
            frame.source_rows.len(),
            df.height()
        ));
        Ok((frame, bundle))
    }

    /// Scale `df` with previously fitted statistics, without refitting.
    pub fn transform(&self, df: &DataFrame, bundle: &StatisticsBundle) -> Result<ScaledFrame> {
        self.check_bundle(df, bundle)?;

        let dates = date_keys(df, &self.date_column)?;
        check_date_kind(&dates, bundle)?;

        let matrix = FeatureMatrix::from_frame(df, bundle.feature_columns())?;
        let sorted = sorted_positions(&dates);
        let groups = group_by_date(&dates, &sorted);

        let (scaled, unmatched) = scale_groups(&matrix, &groups, |date| bundle.snapshot_asof(date));
        self.report_unmatched(unmatched);
        let frame = self.assemble(df, bundle.feature_columns(), &sorted, scaled)?;

        self.logger.info(&format!(
            "Applied {} fitted dates to {} dates, kept {} of {} rows",
            bundle.len(),
            groups.len(),
            frame.source_rows.len(),
            df.height()
        ));
        Ok(frame)
    }

    /// Apply one bundle to many frames in parallel.
    pub fn transform_many(&self, frames: &[DataFrame], bundle: &StatisticsBundle) -> Vec<Result<ScaledFrame>> {
        frames.par_iter().map(|df| self.transform(df, bundle)).collect()
    }

    /// Map scaled values back to the original feature scale.
    ///
    /// Each row is restored with the snapshot an apply call would have used
    /// for its date, so the output of `fit_transform` or `transform` comes
    /// back unchanged up to rounding.
    pub fn inverse_transform(&self, scaled: &DataFrame, bundle: &StatisticsBundle) -> Result<ScaledFrame> {
        self.check_bundle(scaled, bundle)?;

        let dates = date_keys(scaled, &self.date_column)?;
        check_date_kind(&dates, bundle)?;

        let matrix = FeatureMatrix::from_frame(scaled, bundle.feature_columns())?;
        let sorted = sorted_positions(&dates);
        let groups = group_by_date(&dates, &sorted);

        let mut restored = vec![vec![None; matrix.height()]; matrix.width()];
        let mut row = Vec::with_capacity(matrix.width());
        for (date, rows) in &groups {
            let Some(snapshot) = bundle.snapshot_asof(date) else { continue };
            for &r in rows {
                matrix.read_row(r, &mut row);
                for (j, &z) in row.iter().enumerate() {
                    restored[j][r] = present(snapshot.unscale(j, z));
                }
            }
        }

        self.assemble(scaled, bundle.feature_columns(), &sorted, restored)
    }

    fn report_unmatched(&self, unmatched: usize) {
        if unmatched > 0 {
            self.logger.debug(&format!("{} dates have no prior statistics, their rows are dropped", unmatched));
        }
    }

    fn check_merge_columns(&self, df: &DataFrame) -> Result<()> {
        for name in &self.merge_columns {
            require_column(df, name)?;
        }
        Ok(())
    }

    fn check_bundle(&self, df: &DataFrame, bundle: &StatisticsBundle) -> Result<()> {
        if bundle.date_column() != self.date_column {
            return Err(ScalerError::ConfigurationMismatch {
                fitted: bundle.date_column().to_string(),
                requested: self.date_column.clone(),
            });
        }
        bundle.validate()?;

        for name in bundle.feature_columns() {
            if *name == self.date_column || self.merge_columns.contains(name) {
                return Err(ScalerError::ColumnCollision(name.clone()));
            }
            require_column(df, name)?;
        }
        self.check_merge_columns(df)
    }

    /// Build the output frame from per-feature scaled values.
    ///
    /// Rows are emitted in date order and dropped when every feature is
    /// missing.
    fn assemble(
        &self,
        df: &DataFrame,
        feature_columns: &[String],
        sorted: &[usize],
        scaled: Vec<Vec<Option<f64>>>,
    ) -> Result<ScaledFrame> {
        let kept: Vec<usize> = sorted
            .iter()
            .copied()
            .filter(|&r| scaled.iter().any(|column| column[r].is_some()))
            .collect();

        let mut columns: Vec<Column> = feature_columns
            .iter()
            .zip(&scaled)
            .map(|(name, values)| {
                let values: Vec<Option<f64>> = kept.iter().map(|&r| values[r]).collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();

        let idx = IdxCa::from_vec("idx".into(), kept.iter().map(|&r| r as IdxSize).collect());
        let passthrough = df
            .select(std::iter::once(&self.date_column).chain(&self.merge_columns).map(String::as_str))?
            .take(&idx)?;
        columns.extend(passthrough.get_columns().iter().cloned());

        Ok(ScaledFrame {
            frame: DataFrame::new(columns)?,
            source_rows: kept,
        })
    }
}

/// A value counts as missing when it is NaN.
fn present(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

/// Scale every row group with the snapshot `lookup` finds for its date.
///
/// Output is feature-major and indexed by input row; rows whose date has
/// no snapshot stay `None`. Also returns how many dates had no snapshot.
fn scale_groups<'a, F>(
    matrix: &FeatureMatrix,
    groups: &[(DateKey, Vec<usize>)],
    lookup: F,
) -> (Vec<Vec<Option<f64>>>, usize)
where
    F: Fn(&DateKey) -> Option<&'a Snapshot>,
{
    let mut scaled = vec![vec![None; matrix.height()]; matrix.width()];
    let mut row = Vec::with_capacity(matrix.width());
    let mut unmatched = 0;

    for (date, rows) in groups {
        let Some(snapshot) = lookup(date) else {
            tracing::trace!(%date, "no prior statistics");
            unmatched += 1;
            continue;
        };
        for &r in rows {
            matrix.read_row(r, &mut row);
            for (j, &x) in row.iter().enumerate() {
                scaled[j][r] = present(snapshot.scale(j, x));
            }
        }
    }

    (scaled, unmatched)
}

fn check_date_kind(dates: &[Option<DateKey>], bundle: &StatisticsBundle) -> Result<()> {
    let found = dates.iter().flatten().next().map(DateKey::kind);
    match (bundle.date_kind(), found) {
        (Some(fitted), Some(found)) if fitted != found => Err(ScalerError::DateKindMismatch { fitted, found }),
        _ => Ok(()),
    }
}

/// Fit-and-transform with the contract signature.
pub fn fit_transform(
    df: &DataFrame,
    date_column: &str,
    merge_columns: &[String],
    min_periods: usize,
) -> Result<(ScaledFrame, StatisticsBundle)> {
    ExpandingDateScaler::new(date_column, merge_columns, min_periods).fit_transform(df)
}

/// Transform-only with the contract signature.
pub fn transform(
    df: &DataFrame,
    date_column: &str,
    bundle: &StatisticsBundle,
    merge_columns: &[String],
) -> Result<ScaledFrame> {
    ExpandingDateScaler::new(date_column, merge_columns, bundle.min_periods()).transform(df, bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::statistics::STD_EPSILON;
    use rand::Rng;

    const TOL: f64 = 1e-9;

    fn values(frame: &DataFrame, name: &str) -> Vec<Option<f64>> {
        frame.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    fn dates(frame: &DataFrame, name: &str) -> Vec<i64> {
        frame
            .column(name)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be present");
        assert!(
            (actual - expected).abs() < TOL,
            "expected {expected}, got {actual}"
        );
    }

    fn example_frame() -> DataFrame {
        df!("date" => [1i64, 1, 2], "f" => [10.0, 20.0, 30.0]).unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let (scaled, bundle) = fit_transform(&example_frame(), "date", &[], 0).unwrap();

        let f = values(&scaled.frame, "f");
        assert_close(f[0], -1.0);
        assert_close(f[1], 1.0);
        assert_close(f[2], 10.0 / (200.0f64 / 3.0).sqrt());
        assert_eq!(dates(&scaled.frame, "date"), vec![1, 1, 2]);
        assert_eq!(scaled.source_rows, vec![0, 1, 2]);

        assert_eq!(bundle.means(&DateKey::Int(1)), Some(&[15.0][..]));
        assert_eq!(bundle.stds(&DateKey::Int(1)), Some(&[5.0][..]));

        let new = df!("date" => [3i64], "f" => [25.0]).unwrap();
        let applied = transform(&new, "date", &bundle, &[]).unwrap();
        assert_close(values(&applied.frame, "f")[0], 5.0 / (200.0f64 / 3.0).sqrt());
        assert!((values(&applied.frame, "f")[0].unwrap() - 0.6124).abs() < 1e-4);
    }

    #[test]
    fn test_output_layout() {
        let df = df!(
            "id" => ["a", "b", "c"],
            "x" => [1.0, 2.0, 3.0],
            "date" => [2i64, 1, 1],
            "y" => [4i32, 5, 6]
        )
        .unwrap();
        let merge = vec!["id".to_string(), "date".to_string(), "id".to_string()];
        let (scaled, bundle) = fit_transform(&df, "date", &merge, 0).unwrap();

        assert_eq!(bundle.feature_columns(), &["x".to_string(), "y".to_string()]);
        let names: Vec<String> = scaled
            .frame
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["x", "y", "date", "id"]);

        // sorted by date, stable within a date
        assert_eq!(scaled.source_rows, vec![1, 2, 0]);
        let ids: Vec<&str> = scaled
            .frame
            .column("id")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_min_periods_gate() {
        let df = df!("date" => [1i64, 2, 3, 3], "f" => [1.0, 2.0, 3.0, 4.0]).unwrap();
        let (scaled, bundle) = fit_transform(&df, "date", &[], 2).unwrap();

        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.min_periods(), 2);
        assert_eq!(dates(&scaled.frame, "date"), vec![3, 3]);

        // the gated dates still feed the statistics of date 3
        let snapshot = bundle.snapshot(&DateKey::Int(3)).unwrap();
        assert!((snapshot.means[0] - 2.5).abs() < TOL);
    }

    #[test]
    fn test_min_periods_beyond_dates() {
        let (scaled, bundle) = fit_transform(&example_frame(), "date", &[], 5).unwrap();
        assert!(bundle.is_empty());
        assert_eq!(scaled.frame.height(), 0);
        assert!(scaled.source_rows.is_empty());
    }

    #[test]
    fn test_constant_feature_scales_to_zero() {
        let df = df!("date" => [1i64, 2, 3], "c" => [7.0, 7.0, 7.0], "f" => [1.0, 2.0, 3.0]).unwrap();
        let (scaled, bundle) = fit_transform(&df, "date", &[], 0).unwrap();

        assert_eq!(bundle.stds(&DateKey::Int(3)).unwrap()[0], STD_EPSILON);
        for v in values(&scaled.frame, "c") {
            assert_eq!(v, Some(0.0));
        }
        // single observation at the first date is degenerate for every feature
        assert_eq!(values(&scaled.frame, "f")[0], Some(0.0));
    }

    #[test]
    fn test_expanding_statistics_grow() {
        let df = df!("date" => [1i64, 2, 2, 3], "f" => [1.0, 5.0, 3.0, 100.0]).unwrap();
        let (_, bundle) = fit_transform(&df, "date", &[], 0).unwrap();

        let means: Vec<f64> = bundle.snapshots().iter().map(|s| s.means[0]).collect();
        assert!((means[0] - 1.0).abs() < TOL);
        assert!((means[1] - 3.0).abs() < TOL);
        assert!((means[2] - 27.25).abs() < TOL);
    }

    #[test]
    fn test_no_look_ahead_in_fit() {
        let mut rng = rand::rng();
        let base: Vec<f64> = (0..40).map(|_| rng.random_range(-50.0..50.0)).collect();
        let days: Vec<i64> = (0..40).map(|i| i / 4).collect();

        let df = df!("date" => days.clone(), "f" => base.clone()).unwrap();
        let (reference, _) = fit_transform(&df, "date", &[], 0).unwrap();

        // perturb every row after day 4
        let perturbed: Vec<f64> = base
            .iter()
            .zip(&days)
            .map(|(&x, &d)| if d > 4 { x * 3.0 + rng.random_range(-10.0..10.0) } else { x })
            .collect();
        let df = df!("date" => days.clone(), "f" => perturbed).unwrap();
        let (changed, _) = fit_transform(&df, "date", &[], 0).unwrap();

        let reference_f = values(&reference.frame, "f");
        let changed_f = values(&changed.frame, "f");
        for (i, &row) in reference.source_rows.iter().enumerate() {
            if days[row] <= 4 {
                assert_eq!(reference_f[i], changed_f[i]);
            }
        }
    }

    #[test]
    fn test_asof_uses_latest_prior_snapshot() {
        let df = df!("date" => [1i64, 3, 5], "f" => [1.0, 2.0, 9.0]).unwrap();
        let (_, bundle) = fit_transform(&df, "date", &[], 0).unwrap();
        let d3 = bundle.snapshot(&DateKey::Int(3)).unwrap().clone();

        let new = df!("date" => [4i64, 0], "f" => [6.0, 6.0]).unwrap();
        let applied = transform(&new, "date", &bundle, &[]).unwrap();

        // date 0 precedes every fitted date and is dropped
        assert_eq!(applied.source_rows, vec![0]);
        assert_close(values(&applied.frame, "f")[0], d3.scale(0, 6.0));
    }

    #[test]
    fn test_scale_groups_counts_unmatched_dates() {
        let df = df!("date" => [1i64, 3, 5], "f" => [1.0, 2.0, 9.0]).unwrap();
        let (_, bundle) = fit_transform(&df, "date", &[], 0).unwrap();

        let new = df!("date" => [0i64, 0, -2, 4], "f" => [1.0, 2.0, 3.0, 4.0]).unwrap();
        let dates = date_keys(&new, "date").unwrap();
        let sorted = sorted_positions(&dates);
        let groups = group_by_date(&dates, &sorted);
        let matrix = FeatureMatrix::from_frame(&new, bundle.feature_columns()).unwrap();

        let (scaled, unmatched) = scale_groups(&matrix, &groups, |date| bundle.snapshot_asof(date));
        assert_eq!(unmatched, 2);
        assert_eq!(scaled[0][0], None);
        assert_eq!(scaled[0][2], None);
        assert!(scaled[0][3].is_some());
    }

    #[test]
    fn test_apply_exact_date_matches_fit() {
        let df = df!("date" => [1i64, 1, 2, 3], "f" => [2.0, 4.0, 8.0, 16.0]).unwrap();
        let (fitted, bundle) = fit_transform(&df, "date", &[], 0).unwrap();
        let applied = transform(&df, "date", &bundle, &[]).unwrap();

        assert_eq!(fitted.source_rows, applied.source_rows);
        assert_eq!(values(&fitted.frame, "f"), values(&applied.frame, "f"));
    }

    #[test]
    fn test_apply_ignores_extra_columns() {
        let (_, bundle) = fit_transform(&example_frame(), "date", &[], 0).unwrap();
        let new = df!("extra" => [1.0], "f" => [20.0], "date" => [2i64]).unwrap();
        let applied = transform(&new, "date", &bundle, &[]).unwrap();

        let names: Vec<String> = applied
            .frame
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["f", "date"]);
        assert_close(values(&applied.frame, "f")[0], 0.0);
    }

    #[test]
    fn test_date_column_mismatch() {
        let (_, bundle) = fit_transform(&example_frame(), "date", &[], 0).unwrap();
        let new = df!("day" => [3i64], "f" => [25.0]).unwrap();
        assert!(matches!(
            transform(&new, "day", &bundle, &[]),
            Err(ScalerError::ConfigurationMismatch { fitted, requested }) if fitted == "date" && requested == "day"
        ));
    }

    #[test]
    fn test_feature_collides_with_merge_column() {
        let (_, bundle) = fit_transform(&example_frame(), "date", &[], 0).unwrap();
        assert!(matches!(
            transform(&example_frame(), "date", &bundle, &["f".to_string()]),
            Err(ScalerError::ColumnCollision(name)) if name == "f"
        ));
    }

    #[test]
    fn test_missing_feature_at_apply() {
        let (_, bundle) = fit_transform(&example_frame(), "date", &[], 0).unwrap();
        let new = df!("date" => [3i64], "g" => [25.0]).unwrap();
        assert!(matches!(
            transform(&new, "date", &bundle, &[]),
            Err(ScalerError::MissingColumn(name)) if name == "f"
        ));
    }

    #[test]
    fn test_date_kind_mismatch() {
        let (_, bundle) = fit_transform(&example_frame(), "date", &[], 0).unwrap();
        let new = df!("date" => ["3"], "f" => [25.0]).unwrap();
        assert!(matches!(
            transform(&new, "date", &bundle, &[]),
            Err(ScalerError::DateKindMismatch { fitted: "integer", found: "string" })
        ));
    }

    #[test]
    fn test_fit_errors() {
        let only_date = df!("date" => [1i64]).unwrap();
        assert!(matches!(
            fit_transform(&only_date, "date", &[], 0),
            Err(ScalerError::NoFeatureColumns)
        ));

        assert!(matches!(
            fit_transform(&example_frame(), "date", &["missing".to_string()], 0),
            Err(ScalerError::MissingColumn(name)) if name == "missing"
        ));

        let text = df!("date" => [1i64], "name" => ["x"]).unwrap();
        assert!(matches!(
            fit_transform(&text, "date", &[], 0),
            Err(ScalerError::NonNumericFeature { .. })
        ));
    }

    #[test]
    fn test_null_dates_dropped() {
        let df = df!("date" => [Some(1i64), None, Some(2)], "f" => [1.0, 2.0, 3.0]).unwrap();
        let (scaled, bundle) = fit_transform(&df, "date", &[], 0).unwrap();
        assert_eq!(scaled.source_rows, vec![0, 2]);
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn test_partial_missing_row_kept() {
        let df = df!(
            "date" => [1i64, 2],
            "a" => [1.0, 2.0],
            "b" => [Some(1.0), None]
        )
        .unwrap();
        let applied_df = df!(
            "date" => [2i64, 2],
            "a" => [None, Some(3.0)],
            "b" => [None::<f64>, None]
        )
        .unwrap();

        let (_, bundle) = fit_transform(&df.head(Some(1)), "date", &[], 0).unwrap();
        let applied = transform(&applied_df, "date", &bundle, &[]).unwrap();

        // the all-null row goes, the half-null row survives
        assert_eq!(applied.source_rows, vec![1]);
        assert_eq!(values(&applied.frame, "b"), vec![None]);
        assert!(values(&applied.frame, "a")[0].is_some());
    }

    #[test]
    fn test_inverse_round_trip() {
        let df = df!(
            "date" => [3i64, 1, 2, 2, 1, 3],
            "x" => [5.0, -1.0, 2.5, 8.0, 4.0, 0.5],
            "y" => [100i64, 200, 150, 175, 125, 300]
        )
        .unwrap();
        let scaler = ExpandingDateScaler::new("date", &[], 0);
        let (scaled, bundle) = scaler.fit_transform(&df).unwrap();
        let restored = scaler.inverse_transform(&scaled.frame, &bundle).unwrap();

        let x = df.column("x").unwrap().f64().unwrap();
        let restored_x = values(&restored.frame, "x");
        for (i, &row) in scaled.source_rows.iter().enumerate() {
            let out_row = restored.source_rows[i];
            assert_close(restored_x[i], x.get(row).unwrap());
            assert_eq!(out_row, i);
        }

        let restored_y = values(&restored.frame, "y");
        assert_close(restored_y[0], 200.0);
    }

    #[test]
    fn test_transform_many() {
        let (_, bundle) = fit_transform(&example_frame(), "date", &[], 0).unwrap();
        let frames = vec![
            df!("date" => [3i64], "f" => [25.0]).unwrap(),
            df!("date" => [0i64], "f" => [25.0]).unwrap(),
            df!("day" => [3i64], "f" => [25.0]).unwrap(),
        ];

        let scaler = ExpandingDateScaler::new("date", &[], 0);
        let results = scaler.transform_many(&frames, &bundle);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().frame.height(), 1);
        assert_eq!(results[1].as_ref().unwrap().frame.height(), 0);
        assert!(matches!(results[2], Err(ScalerError::MissingColumn(_))));
    }

    #[test]
    fn test_from_setting() {
        use crate::setting::SettingValue;

        let mut setting = ScalerSetting::new();
        setting.set(DATE_COLUMN, SettingValue::String("year".to_string()));
        setting.set(
            MERGE_COLUMNS,
            SettingValue::List(vec!["year".to_string(), "state".to_string()]),
        );
        setting.set(MIN_PERIODS, SettingValue::Int(3));

        let scaler = ExpandingDateScaler::from_setting(&setting);
        assert_eq!(scaler.date_column(), "year");
        assert_eq!(scaler.merge_columns(), &["state".to_string()]);
        assert_eq!(scaler.min_periods(), 3);
    }

    #[test]
    fn test_date_typed_column() {
        let date = Column::new("date".into(), [19723i32, 19724, 19724])
            .cast(&DataType::Date)
            .unwrap();
        let f = Column::new("f".into(), [1.0, 2.0, 4.0]);
        let df = DataFrame::new(vec![f, date]).unwrap();

        let (scaled, bundle) = fit_transform(&df, "date", &[], 1).unwrap();
        assert_eq!(bundle.date_kind(), Some("date"));
        assert_eq!(scaled.source_rows, vec![1, 2]);
        assert_eq!(scaled.frame.column("date").unwrap().dtype(), &DataType::Date);

        let json = serde_json::to_string(&bundle).unwrap();
        let restored: StatisticsBundle = serde_json::from_str(&json).unwrap();
        let applied = transform(&df, "date", &restored, &[]).unwrap();
        assert_eq!(values(&applied.frame, "f"), values(&scaled.frame, "f"));
    }
}
