//! Engine entry point: runs the analyzers over one record set and window

use crate::config::EngineConfig;
use crate::dora::DoraCalculator;
use crate::error::Result;
use crate::models::{CommitRecord, DeploymentEvent, IssueRecord, PullRequestRecord};
use crate::pr_cycle::PrCycleAnalyzer;
use crate::productivity::ProductivityAnalyzer;
use crate::report::CombinedReport;
use crate::window::TimeWindow;
use serde::{Deserialize, Serialize};

/// The four record sequences one collection cycle produces
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSet {
    pub pull_requests: Vec<PullRequestRecord>,
    pub issues: Vec<IssueRecord>,
    pub commits: Vec<CommitRecord>,
    pub deployments: Vec<DeploymentEvent>,
}

impl RecordSet {
    pub fn is_empty(&self) -> bool {
        self.pull_requests.is_empty()
            && self.issues.is_empty()
            && self.commits.is_empty()
            && self.deployments.is_empty()
    }
}

/// Pure metrics engine: (records, window, config) -> combined report
///
/// Holds only the read-only configuration passed at construction; every
/// `compute` call is an independent pass over an already-materialized record
/// set, with no state carried between invocations.
pub struct MetricsEngine {
    config: EngineConfig,
}

impl MetricsEngine {
    /// Create an engine, failing fast on invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create an engine with the default configuration
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute all three metric sections over the in-window records
    ///
    /// The analyzers share the same immutable borrows and have no data
    /// dependency on one another, so they run concurrently. Data problems
    /// degrade individual metrics to sentinels; this call always yields a
    /// complete report.
    pub fn compute(&self, records: &RecordSet, window: &TimeWindow) -> CombinedReport {
        tracing::info!(
            pull_requests = records.pull_requests.len(),
            issues = records.issues.len(),
            commits = records.commits.len(),
            deployments = records.deployments.len(),
            window_start = %window.start(),
            window_end = %window.end(),
            "computing delivery metrics"
        );

        let (dora, (pull_requests, productivity)) = rayon::join(
            || {
                DoraCalculator::new(&self.config).calculate(
                    &records.pull_requests,
                    &records.issues,
                    &records.deployments,
                    window,
                )
            },
            || {
                rayon::join(
                    || PrCycleAnalyzer::new(&self.config).analyze(&records.pull_requests, window),
                    || {
                        ProductivityAnalyzer::new(&self.config).analyze(
                            &records.commits,
                            &records.pull_requests,
                            window,
                        )
                    },
                )
            },
        );

        let report = CombinedReport::new(window, dora, pull_requests, productivity);
        if report.skipped_records > 0 {
            tracing::warn!(
                skipped = report.skipped_records,
                "records excluded during metric computation"
            );
        }
        report
    }
}
