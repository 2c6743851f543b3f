//! FILENAME: core/engine/src/time_index.rs
//! PURPOSE: Derives the date/time label of every matrix row.
//! CONTEXT: The remote store describes a time series with a compact descriptor
//! (start date, number of steps, granularity). The i-th row is `start + i`
//! units of the granularity; months and years clamp to the end of the month
//! so that Feb 29 + 1 year lands on Feb 28.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted layouts for `start_date` besides RFC 3339.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// ISO-8601 output with millisecond precision.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeIndexError {
    #[error("invalid start date: {0}")]
    InvalidStartDate(String),

    #[error("date overflow at step {0}")]
    OutOfRange(usize),
}

/// Granularity of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    #[serde(alias = "yearly")]
    Annual,
}

/// Time series descriptor as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMetadata {
    pub start_date: String,
    pub steps: usize,
    /// Length in days of the first week of the study year.
    /// Carried for display purposes; it does not shift index dates.
    #[serde(default = "default_first_week_size")]
    pub first_week_size: u32,
    pub level: TimeFrequency,
}

fn default_first_week_size() -> u32 {
    7
}

impl TimeMetadata {
    pub fn new(start_date: impl Into<String>, steps: usize, level: TimeFrequency) -> Self {
        TimeMetadata {
            start_date: start_date.into(),
            steps,
            first_week_size: default_first_week_size(),
            level,
        }
    }

    /// Parses `start_date`. Dates without an offset are taken as UTC.
    pub fn start(&self) -> Result<DateTime<Utc>, TimeIndexError> {
        parse_start_date(&self.start_date)
    }

    /// Lazy index over the row dates.
    pub fn index(&self) -> Result<DateTimeIndex, TimeIndexError> {
        Ok(DateTimeIndex {
            start: self.start()?,
            level: self.level,
            position: 0,
            steps: self.steps,
        })
    }
}

pub fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, TimeIndexError> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimeIndexError::InvalidStartDate(raw.to_string()))
}

/// Date of step `step` counted from `start`.
pub fn offset(start: DateTime<Utc>, level: TimeFrequency, step: usize) -> Option<DateTime<Utc>> {
    let n = i64::try_from(step).ok()?;
    match level {
        TimeFrequency::Hourly => start.checked_add_signed(Duration::try_hours(n)?),
        TimeFrequency::Daily => start.checked_add_signed(Duration::try_days(n)?),
        TimeFrequency::Weekly => start.checked_add_signed(Duration::try_weeks(n)?),
        TimeFrequency::Monthly => start.checked_add_months(Months::new(u32::try_from(step).ok()?)),
        TimeFrequency::Annual => {
            let months = u32::try_from(step).ok()?.checked_mul(12)?;
            start.checked_add_months(Months::new(months))
        }
    }
}

/// Iterator over the dates of a time series. Finite; holds no shared state,
/// so `TimeMetadata::index` always starts a fresh pass. Yields exactly `steps`
/// items: a step whose date overflows yields `OutOfRange` instead of ending
/// the iteration early.
#[derive(Debug, Clone)]
pub struct DateTimeIndex {
    start: DateTime<Utc>,
    level: TimeFrequency,
    position: usize,
    steps: usize,
}

impl Iterator for DateTimeIndex {
    type Item = Result<DateTime<Utc>, TimeIndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.steps {
            return None;
        }
        let step = self.position;
        self.position += 1;
        Some(offset(self.start, self.level, step).ok_or(TimeIndexError::OutOfRange(step)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.steps.saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateTimeIndex {}

/// Generates exactly `steps` ISO-8601 strings for the descriptor.
pub fn generate(metadata: &TimeMetadata) -> Result<Vec<String>, TimeIndexError> {
    metadata.index()?.map(|date| date.map(|d| format_iso(&d))).collect()
}

/// Same as `generate`, with short labels (see `format_label`).
pub fn generate_labels(metadata: &TimeMetadata) -> Result<Vec<String>, TimeIndexError> {
    let level = metadata.level;
    metadata.index()?.map(|date| date.map(|d| format_label(&d, level))).collect()
}

pub fn format_iso(date: &DateTime<Utc>) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Short human label of a row date for the given granularity.
pub fn format_label(date: &DateTime<Utc>, level: TimeFrequency) -> String {
    let pattern = match level {
        TimeFrequency::Hourly => "%a %-d %b %H:%M",
        TimeFrequency::Daily => "%a %-d %b",
        TimeFrequency::Weekly => "W. %V",
        TimeFrequency::Monthly => "%b %Y",
        TimeFrequency::Annual => "%Y",
    };
    date.format(pattern).to_string()
}
