//! Column parsing helpers: date keys and numeric feature matrices.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScalerError};

/// Orderable value of the date column.
///
/// All keys taken from one column share a variant, so ordering between
/// variants never decides anything.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DateKey {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Int(i64),
    Text(String),
}

impl DateKey {
    pub fn kind(&self) -> &'static str {
        match self {
            DateKey::Date(_) => "date",
            DateKey::DateTime(_) => "datetime",
            DateKey::Int(_) => "integer",
            DateKey::Text(_) => "string",
        }
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateKey::Date(d) => write!(f, "{}", d),
            DateKey::DateTime(dt) => write!(f, "{}", dt),
            DateKey::Int(i) => write!(f, "{}", i),
            DateKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DateKey {
    fn from(value: &str) -> Self {
        DateKey::Text(value.to_string())
    }
}

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date_from_days(days: i32) -> Result<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or(ScalerError::InvalidTimestamp(days as i64))
}

fn datetime_from_timestamp(value: i64, unit: TimeUnit) -> Result<NaiveDateTime> {
    let datetime = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
    };
    datetime
        .map(|dt| dt.naive_utc())
        .ok_or(ScalerError::InvalidTimestamp(value))
}

fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Types a feature column may have.
pub fn is_numeric(dtype: &DataType) -> bool {
    is_integer(dtype)
        || matches!(
            dtype,
            DataType::Float32 | DataType::Float64 | DataType::Boolean | DataType::Null
        )
}

/// Look up a column, reporting absent names as `MissingColumn`.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ScalerError::MissingColumn(name.to_string()))
}

/// Parse the date column into one optional key per row.
///
/// Accepts `Date`, `Datetime`, integer and string columns. Float columns
/// are rejected rather than used as dates, so a fractional `year` column
/// has to be cast to an integer first. Unsigned values above `i64::MAX`
/// are an error, never a null date.
pub fn date_keys(df: &DataFrame, date_column: &str) -> Result<Vec<Option<DateKey>>> {
    let series = require_column(df, date_column)?.as_materialized_series();

    let keys = match series.dtype() {
        DataType::Date => series
            .cast(&DataType::Int32)?
            .i32()?
            .into_iter()
            .map(|days| days.map(date_from_days).transpose().map(|d| d.map(DateKey::Date)))
            .collect::<Result<Vec<_>>>()?,
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            series
                .cast(&DataType::Int64)?
                .i64()?
                .into_iter()
                .map(|ts| {
                    ts.map(|ts| datetime_from_timestamp(ts, unit))
                        .transpose()
                        .map(|dt| dt.map(DateKey::DateTime))
                })
                .collect::<Result<Vec<_>>>()?
        }
        dtype if is_integer(dtype) => series
            .strict_cast(&DataType::Int64)
            .map_err(|_| ScalerError::DateOutOfRange(date_column.to_string()))?
            .i64()?
            .into_iter()
            .map(|v| v.map(DateKey::Int))
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.map(DateKey::from))
            .collect(),
        dtype => {
            return Err(ScalerError::UnsupportedDateType {
                column: date_column.to_string(),
                dtype: dtype.to_string(),
            })
        }
    };

    Ok(keys)
}

/// Row positions with a non-null date, stably sorted by date.
pub fn sorted_positions(dates: &[Option<DateKey>]) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..dates.len()).filter(|&i| dates[i].is_some()).collect();
    positions.sort_by(|&a, &b| dates[a].cmp(&dates[b]));
    positions
}

/// Split date-sorted positions into runs sharing one date.
pub fn group_by_date(dates: &[Option<DateKey>], sorted: &[usize]) -> Vec<(DateKey, Vec<usize>)> {
    let mut groups: Vec<(DateKey, Vec<usize>)> = Vec::new();

    for &row in sorted {
        let Some(date) = &dates[row] else { continue };
        match groups.last_mut() {
            Some((current, rows)) if current == date => rows.push(row),
            _ => groups.push((date.clone(), vec![row])),
        }
    }

    groups
}

/// Feature values as f64 columns; nulls become NaN.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    columns: Vec<Vec<f64>>,
    height: usize,
}

impl FeatureMatrix {
    pub fn from_frame(df: &DataFrame, feature_columns: &[String]) -> Result<Self> {
        let mut columns = Vec::with_capacity(feature_columns.len());

        for name in feature_columns {
            let series = require_column(df, name)?.as_materialized_series();
            if !is_numeric(series.dtype()) {
                return Err(ScalerError::NonNumericFeature {
                    column: name.clone(),
                    dtype: series.dtype().to_string(),
                });
            }

            let values: Vec<f64> = series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            columns.push(values);
        }

        Ok(Self {
            columns,
            height: df.height(),
        })
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Copy one row into `buf`, replacing its contents.
    pub fn read_row(&self, row: usize, buf: &mut Vec<f64>) {
        buf.clear();
        buf.extend(self.columns.iter().map(|column| column[row]));
    }
}
