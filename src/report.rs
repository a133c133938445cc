//! Report structures shared by all analyzers

use crate::error::Result;
use crate::statistics::SampleSummary;
use crate::window::TimeWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;
use uuid::Uuid;

/// Which analyzer produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    Dora,
    PullRequests,
    Productivity,
}

/// Unit of a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Hours,
    PerWeek,
    PerDay,
    Percent,
    Count,
    Lines,
}

/// One computed metric
///
/// Every result carries its sample size so consumers can judge statistical
/// confidence. When the eligible sample was empty, `value` is the zero
/// sentinel and `insufficient_data` is set; consumers must check the flag
/// before reading `value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricResult {
    pub value: f64,
    pub sample_size: usize,
    pub unit: MetricUnit,
    pub insufficient_data: bool,

    /// Named secondary statistics (median, percentiles, raw counts, ...)
    pub secondary: BTreeMap<String, f64>,
}

impl MetricResult {
    pub fn new(value: f64, sample_size: usize, unit: MetricUnit) -> Self {
        Self {
            value,
            sample_size,
            unit,
            insufficient_data: false,
            secondary: BTreeMap::new(),
        }
    }

    /// Zero-sentinel result for an empty eligible sample
    pub fn insufficient(unit: MetricUnit) -> Self {
        Self {
            value: 0.0,
            sample_size: 0,
            unit,
            insufficient_data: true,
            secondary: BTreeMap::new(),
        }
    }

    pub fn with_secondary(mut self, name: impl Into<String>, value: f64) -> Self {
        self.secondary.insert(name.into(), value);
        self
    }

    /// Build a duration-style result from a sample summary
    ///
    /// The mean is the primary value; median, min, max and the requested
    /// percentiles land in `secondary`.
    pub fn from_summary(summary: &SampleSummary, unit: MetricUnit) -> Self {
        let mut result = Self {
            value: summary.mean,
            sample_size: summary.count,
            unit,
            insufficient_data: summary.insufficient_data,
            secondary: BTreeMap::new(),
        };
        result.secondary.insert("median".to_string(), summary.median);
        result.secondary.insert("min".to_string(), summary.min);
        result.secondary.insert("max".to_string(), summary.max);
        for (label, value) in &summary.percentiles {
            result.secondary.insert(label.clone(), *value);
        }
        result
    }
}

/// Report emitted by one analyzer: a mapping from metric name to result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricReport {
    pub id: Uuid,
    pub section: ReportSection,
    pub generated_at: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,

    pub metrics: BTreeMap<String, MetricResult>,

    /// Non-numeric markers (e.g. which deployment source was used)
    pub annotations: BTreeMap<String, String>,

    /// Analyzer-specific structured detail (per-developer breakdowns, ...)
    pub data: serde_json::Value,

    /// Records excluded during this analyzer's traversal
    pub skipped_records: usize,
}

impl MetricReport {
    pub fn new(section: ReportSection, window: &TimeWindow) -> Self {
        Self {
            id: Uuid::new_v4(),
            section,
            generated_at: Utc::now(),
            window_start: window.start(),
            window_end: window.end(),
            metrics: BTreeMap::new(),
            annotations: BTreeMap::new(),
            data: serde_json::Value::Null,
            skipped_records: 0,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, result: MetricResult) {
        self.metrics.insert(name.into(), result);
    }

    pub fn annotate(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations.insert(key.into(), value.into());
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Look up a metric by name
    pub fn metric(&self, name: &str) -> Option<&MetricResult> {
        self.metrics.get(name)
    }
}

/// The merged output of one engine invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,

    pub dora: MetricReport,
    pub pull_requests: MetricReport,
    pub productivity: MetricReport,

    /// Total records excluded across all sections
    pub skipped_records: usize,
}

impl CombinedReport {
    pub fn new(
        window: &TimeWindow,
        dora: MetricReport,
        pull_requests: MetricReport,
        productivity: MetricReport,
    ) -> Self {
        let skipped_records =
            dora.skipped_records + pull_requests.skipped_records + productivity.skipped_records;
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            window_start: window.start(),
            window_end: window.end(),
            dora,
            pull_requests,
            productivity,
            skipped_records,
        }
    }

    /// Serialize the report for an external storage or rendering collaborator
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
