//! Software delivery performance engine
//!
//! This crate turns a stream of normalized repository activity records
//! (pull requests, issues, commits, deployment events) into statistical
//! summaries over a configurable time window.
//!
//! # Features
//!
//! - **DORA metrics**: deployment frequency, lead time for changes, mean
//!   time to recovery, change failure rate
//! - **PR cycle analysis**: cycle time, time to first review, review
//!   density, merge rate, size distribution
//! - **Productivity analysis**: per-developer activity, collaboration
//!   pairs, team rollups
//! - **Statistical aggregation**: count/mean/median plus arbitrary
//!   percentiles with linear interpolation, defined behavior on empty samples
//!
//! The engine is a pure function of (records, window, configuration): it
//! fetches nothing, persists nothing and renders nothing. Collection,
//! scheduling and presentation are external collaborators. Malformed or
//! partially populated records are skipped per metric and tallied; a
//! complete report always comes back unless the window or configuration is
//! invalid.
//!
//! # Example
//!
//! ```no_run
//! use delivery_metrics::{EngineConfig, MetricsEngine, RecordSet, TimeWindow};
//! use chrono::Utc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = MetricsEngine::new(EngineConfig::default())?;
//!     let window = TimeWindow::ending_at(Utc::now(), 30)?;
//!
//!     let records = RecordSet::default(); // populated by a collector
//!     let report = engine.compute(&records, &window);
//!     println!("{}", report.to_value()?);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dora;
pub mod engine;
pub mod error;
pub mod models;
pub mod pr_cycle;
pub mod productivity;
pub mod report;
pub mod statistics;
pub mod window;

pub use config::{EngineConfig, SizeThresholds};
pub use dora::DoraCalculator;
pub use engine::{MetricsEngine, RecordSet};
pub use error::{EngineError, Result};
pub use models::{
    CommitRecord, DeploymentEvent, DeploymentSource, Identity, IssueRecord, PrState,
    PullRequestRecord,
};
pub use pr_cycle::PrCycleAnalyzer;
pub use productivity::{
    CollaborationPair, DeveloperActivity, ProductivityAnalyzer, ProductivityBreakdown,
    TeamActivity, UNASSIGNED_TEAM,
};
pub use report::{CombinedReport, MetricReport, MetricResult, MetricUnit, ReportSection};
pub use statistics::{summarize, SampleSummary};
pub use window::{filter_window, parse_timestamp, Filtered, TimeWindow, Windowed};
