//! DORA metrics: deployment frequency, lead time, MTTR, change failure rate

use crate::config::EngineConfig;
use crate::models::{DeploymentEvent, IssueRecord, PullRequestRecord};
use crate::report::{MetricReport, MetricResult, MetricUnit, ReportSection};
use crate::statistics::summarize;
use crate::window::{filter_window, TimeWindow};

/// Computes the four DORA indicators over a filtered record set
pub struct DoraCalculator<'a> {
    config: &'a EngineConfig,
}

impl<'a> DoraCalculator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        pull_requests: &[PullRequestRecord],
        issues: &[IssueRecord],
        deployments: &[DeploymentEvent],
        window: &TimeWindow,
    ) -> MetricReport {
        let mut report = MetricReport::new(ReportSection::Dora, window);

        let deployment_count = self.deployment_frequency(deployments, window, &mut report);
        self.lead_time_for_changes(pull_requests, window, &mut report);
        let bug_count = self.mean_time_to_recovery(issues, window, &mut report);
        self.change_failure_rate(deployment_count, bug_count, &mut report);

        report
    }

    /// Deployments per week over the window
    ///
    /// When the supplied events contain no genuine deployment/release signal,
    /// merged-PR proxy events are used instead; the report's
    /// `deployment_source` annotation states which source counted. Zero
    /// events is an exact rate of 0.0, not insufficient data.
    ///
    /// Returns the in-window event count for reuse by the failure rate.
    fn deployment_frequency(
        &self,
        deployments: &[DeploymentEvent],
        window: &TimeWindow,
        report: &mut MetricReport,
    ) -> usize {
        let use_genuine = deployments.iter().any(|d| d.source.is_genuine());
        if !use_genuine && !deployments.is_empty() {
            tracing::warn!("no genuine deployment events; using merged-PR proxy");
        }

        let eligible: Vec<DeploymentEvent> = deployments
            .iter()
            .filter(|d| d.source.is_genuine() == use_genuine)
            .cloned()
            .collect();

        let filtered = filter_window(&eligible, window);
        report.skipped_records += filtered.skipped;

        let total = filtered.records.len();
        let per_week = total as f64 / window.length_weeks();
        let per_day = total as f64 / window.length_days();

        report.annotate(
            "deployment_source",
            if use_genuine {
                "deployment_events"
            } else {
                "merged_pr_proxy"
            },
        );
        report.insert(
            "deployment_frequency",
            MetricResult::new(per_week, total, MetricUnit::PerWeek)
                .with_secondary("per_day", per_day)
                .with_secondary("total_deployments", total as f64),
        );
        total
    }

    /// Creation-to-merge hours for merged in-window PRs
    fn lead_time_for_changes(
        &self,
        pull_requests: &[PullRequestRecord],
        window: &TimeWindow,
        report: &mut MetricReport,
    ) {
        let filtered = filter_window(pull_requests, window);
        report.skipped_records += filtered.skipped;

        let mut lead_times = Vec::new();
        for pr in filtered.records {
            if !pr.is_merged() {
                continue;
            }
            match pr.cycle_time_hours() {
                Some(hours) => lead_times.push(hours),
                None => {
                    // Merged state without a usable merge timestamp
                    report.skipped_records += 1;
                    tracing::debug!(pr = pr.id, "merged PR without valid merge timestamp skipped");
                }
            }
        }

        let summary = summarize(&lead_times, &self.config.percentiles);
        report.insert(
            "lead_time_for_changes",
            MetricResult::from_summary(&summary, MetricUnit::Hours),
        );
    }

    /// Creation-to-close hours for closed bug-labeled in-window issues
    ///
    /// Open bugs are excluded from the sample but reported under
    /// `unresolved_incidents`.
    ///
    /// Returns the count of bug issues created in-window (open or closed)
    /// for reuse by the failure rate.
    fn mean_time_to_recovery(
        &self,
        issues: &[IssueRecord],
        window: &TimeWindow,
        report: &mut MetricReport,
    ) -> usize {
        let filtered = filter_window(issues, window);
        report.skipped_records += filtered.skipped;

        let bugs: Vec<&IssueRecord> = filtered
            .records
            .into_iter()
            .filter(|issue| issue.is_bug(&self.config.bug_labels))
            .collect();
        let bug_count = bugs.len();

        let mut recovery_times = Vec::new();
        let mut unresolved = 0usize;
        for issue in &bugs {
            if !issue.is_closed() {
                unresolved += 1;
                continue;
            }
            match issue.resolution_hours() {
                Some(hours) => recovery_times.push(hours),
                None => {
                    report.skipped_records += 1;
                    tracing::debug!(issue = issue.id, "closed bug with invalid timestamps skipped");
                }
            }
        }

        let summary = summarize(&recovery_times, &self.config.percentiles);
        report.insert(
            "mean_time_to_recovery",
            MetricResult::from_summary(&summary, MetricUnit::Hours),
        );
        report.insert(
            "unresolved_incidents",
            MetricResult::new(unresolved as f64, unresolved, MetricUnit::Count),
        );
        bug_count
    }

    /// Bug issues per deployment, as a percentage
    ///
    /// Zero deployments makes the ratio undefined: the metric is reported
    /// with the `insufficient_data` sentinel, never a division failure.
    fn change_failure_rate(
        &self,
        deployment_count: usize,
        bug_count: usize,
        report: &mut MetricReport,
    ) {
        let result = if deployment_count == 0 {
            MetricResult::insufficient(MetricUnit::Percent)
        } else {
            let rate = bug_count as f64 / deployment_count as f64 * 100.0;
            MetricResult::new(rate, deployment_count, MetricUnit::Percent)
        };
        report.insert(
            "change_failure_rate",
            result
                .with_secondary("bug_issues", bug_count as f64)
                .with_secondary("deployments", deployment_count as f64),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeploymentSource, Identity, PrState};
    use chrono::{Duration, TimeZone, Utc};

    fn window_7d() -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TimeWindow::new(start, start + Duration::days(7)).unwrap()
    }

    fn deployment(hours_in: i64, source: DeploymentSource) -> DeploymentEvent {
        DeploymentEvent {
            deployed_at: window_7d().start() + Duration::hours(hours_in),
            source,
            repository: "org/repo".to_string(),
            succeeded: Some(true),
        }
    }

    fn merged_pr(id: u64, created_hours_in: i64, cycle_hours: i64) -> PullRequestRecord {
        let created_at = window_7d().start() + Duration::hours(created_hours_in);
        PullRequestRecord {
            id,
            author: Identity::new("dev", "dev@x.com"),
            created_at,
            merged_at: Some(created_at + Duration::hours(cycle_hours)),
            closed_at: Some(created_at + Duration::hours(cycle_hours)),
            first_review_at: None,
            reviewers: vec![],
            review_comments: 0,
            additions: 10,
            deletions: 5,
            target_branch: "main".to_string(),
            state: PrState::Merged,
        }
    }

    fn bug_issue(id: u64, created_hours_in: i64, resolution_hours: Option<i64>) -> IssueRecord {
        let created_at = window_7d().start() + Duration::hours(created_hours_in);
        IssueRecord {
            id,
            labels: vec!["bug".to_string()],
            created_at,
            closed_at: resolution_hours.map(|h| created_at + Duration::hours(h)),
            author: Identity::named("reporter"),
        }
    }

    #[test]
    fn five_deployments_in_one_week() {
        let config = EngineConfig::default();
        let deployments: Vec<_> = (0..5)
            .map(|i| deployment(i * 24, DeploymentSource::Deployment))
            .collect();

        let report =
            DoraCalculator::new(&config).calculate(&[], &[], &deployments, &window_7d());
        let freq = report.metric("deployment_frequency").unwrap();
        assert_eq!(freq.value, 5.0);
        assert_eq!(freq.sample_size, 5);
        assert_eq!(report.annotations["deployment_source"], "deployment_events");
    }

    #[test]
    fn proxy_events_count_only_without_genuine_ones() {
        let config = EngineConfig::default();
        let deployments = vec![
            deployment(1, DeploymentSource::MergedPrProxy),
            deployment(2, DeploymentSource::MergedPrProxy),
        ];

        let report =
            DoraCalculator::new(&config).calculate(&[], &[], &deployments, &window_7d());
        let freq = report.metric("deployment_frequency").unwrap();
        assert_eq!(freq.sample_size, 2);
        assert_eq!(report.annotations["deployment_source"], "merged_pr_proxy");

        // One genuine event demotes all proxies
        let mixed = vec![
            deployment(1, DeploymentSource::Release),
            deployment(2, DeploymentSource::MergedPrProxy),
        ];
        let report = DoraCalculator::new(&config).calculate(&[], &[], &mixed, &window_7d());
        assert_eq!(report.metric("deployment_frequency").unwrap().sample_size, 1);
        assert_eq!(report.annotations["deployment_source"], "deployment_events");
    }

    #[test]
    fn lead_time_median_over_two_merged_prs() {
        let config = EngineConfig::default();
        let prs = vec![merged_pr(1, 0, 10), merged_pr(2, 1, 30)];

        let report = DoraCalculator::new(&config).calculate(&prs, &[], &[], &window_7d());
        let lead = report.metric("lead_time_for_changes").unwrap();
        assert_eq!(lead.sample_size, 2);
        assert_eq!(lead.secondary["median"], 20.0);
        assert_eq!(lead.value, 20.0);
    }

    #[test]
    fn unmerged_prs_never_enter_lead_time() {
        let config = EngineConfig::default();
        let mut open_pr = merged_pr(1, 0, 10);
        open_pr.state = PrState::Open;
        open_pr.merged_at = None;
        open_pr.closed_at = None;

        let report =
            DoraCalculator::new(&config).calculate(&[open_pr], &[], &[], &window_7d());
        let lead = report.metric("lead_time_for_changes").unwrap();
        assert_eq!(lead.sample_size, 0);
        assert!(lead.insufficient_data);
    }

    #[test]
    fn mttr_excludes_open_bugs_but_counts_them() {
        let config = EngineConfig::default();
        let issues = vec![
            bug_issue(1, 0, Some(4)),
            bug_issue(2, 1, Some(8)),
            bug_issue(3, 2, None),
        ];

        let report = DoraCalculator::new(&config).calculate(&[], &issues, &[], &window_7d());
        let mttr = report.metric("mean_time_to_recovery").unwrap();
        assert_eq!(mttr.sample_size, 2);
        assert_eq!(mttr.value, 6.0);
        assert_eq!(report.metric("unresolved_incidents").unwrap().value, 1.0);
    }

    #[test]
    fn change_failure_rate_without_deployments_is_insufficient() {
        let config = EngineConfig::default();
        let issues = vec![
            bug_issue(1, 0, None),
            bug_issue(2, 1, None),
            bug_issue(3, 2, None),
        ];

        let report = DoraCalculator::new(&config).calculate(&[], &issues, &[], &window_7d());
        let cfr = report.metric("change_failure_rate").unwrap();
        assert!(cfr.insufficient_data);
        assert_eq!(cfr.secondary["bug_issues"], 3.0);
    }

    #[test]
    fn change_failure_rate_is_a_percentage() {
        let config = EngineConfig::default();
        let deployments: Vec<_> = (0..4)
            .map(|i| deployment(i * 10, DeploymentSource::Deployment))
            .collect();
        let issues = vec![bug_issue(1, 0, Some(2))];

        let report =
            DoraCalculator::new(&config).calculate(&[], &issues, &deployments, &window_7d());
        let cfr = report.metric("change_failure_rate").unwrap();
        assert_eq!(cfr.value, 25.0);
        assert!(!cfr.insufficient_data);
    }
}
