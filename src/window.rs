//! Time windows and in-window record selection

use crate::error::{EngineError, Result};
use crate::models::{CommitRecord, DeploymentEvent, IssueRecord, PullRequestRecord};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A half-open time window: start inclusive, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, failing fast when start >= end
    ///
    /// This is the only caller error that aborts a whole computation.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidWindow(format!(
                "start ({}) must be before end ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// A window of `days` days ending at `end`
    pub fn ending_at(end: DateTime<Utc>, days: i64) -> Result<Self> {
        Self::new(end - Duration::days(days), end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `t` falls in [start, end)
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Window length in (fractional) days
    pub fn length_days(&self) -> f64 {
        self.end.signed_duration_since(self.start).num_seconds() as f64 / 86_400.0
    }

    /// Window length in (fractional) weeks
    pub fn length_weeks(&self) -> f64 {
        self.length_days() / 7.0
    }
}

/// Parse a raw timestamp string into UTC
///
/// Offset-bearing forms (RFC 3339) are converted directly. Timezone-naive
/// forms are interpreted in the reference zone before conversion, so that
/// naive and aware timestamps from the same source compare consistently.
/// Anything else is a [`EngineError::MalformedRecord`]; callers at the
/// collection boundary drop the record and count it as skipped.
pub fn parse_timestamp(raw: &str, reference: Tz) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d"] {
        let parsed = if format == "%Y-%m-%d" {
            chrono::NaiveDate::parse_from_str(raw, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        } else {
            NaiveDateTime::parse_from_str(raw, format).ok()
        };
        if let Some(naive) = parsed {
            // Ambiguous local times (DST folds) resolve to the earlier instant
            return reference
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| {
                    EngineError::MalformedRecord(format!(
                        "timestamp '{}' does not exist in {}",
                        raw, reference
                    ))
                });
        }
    }

    Err(EngineError::MalformedRecord(format!(
        "unparseable timestamp '{}'",
        raw
    )))
}

/// A record with a designated timestamp for window filtering
///
/// Creation time for pull requests and issues, authored time for commits,
/// event time for deployments. `None` means the record lacks a usable
/// timestamp and is excluded (and tallied) rather than treated as an error.
pub trait Windowed {
    fn window_timestamp(&self) -> Option<DateTime<Utc>>;
}

impl Windowed for PullRequestRecord {
    fn window_timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

impl Windowed for IssueRecord {
    fn window_timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

impl Windowed for CommitRecord {
    fn window_timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.authored_at)
    }
}

impl Windowed for DeploymentEvent {
    fn window_timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.deployed_at)
    }
}

/// Result of filtering a record sequence through a window
#[derive(Debug, Clone)]
pub struct Filtered<'a, T> {
    /// Records whose designated timestamp falls in the window
    pub records: Vec<&'a T>,

    /// Records dropped for lack of a usable designated timestamp
    pub skipped: usize,
}

/// Select the in-window subset of `records`
pub fn filter_window<'a, T: Windowed>(records: &'a [T], window: &TimeWindow) -> Filtered<'a, T> {
    let mut kept = Vec::new();
    let mut skipped = 0usize;

    for record in records {
        match record.window_timestamp() {
            Some(t) if window.contains(t) => kept.push(record),
            Some(_) => {}
            None => {
                skipped += 1;
                tracing::debug!("record without designated timestamp skipped");
            }
        }
    }

    Filtered {
        records: kept,
        skipped,
    }
}
