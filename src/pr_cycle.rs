//! Pull request cycle analysis

use crate::config::EngineConfig;
use crate::models::{PrState, PullRequestRecord};
use crate::report::{MetricReport, MetricResult, MetricUnit, ReportSection};
use crate::statistics::summarize;
use crate::window::{filter_window, TimeWindow};

/// Computes cycle-time, review, merge and size metrics per PR
///
/// The sub-metrics are independent: a PR missing the fields one of them
/// needs is excluded from that sample only.
pub struct PrCycleAnalyzer<'a> {
    config: &'a EngineConfig,
}

impl<'a> PrCycleAnalyzer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn analyze(
        &self,
        pull_requests: &[PullRequestRecord],
        window: &TimeWindow,
    ) -> MetricReport {
        let mut report = MetricReport::new(ReportSection::PullRequests, window);

        let filtered = filter_window(pull_requests, window);
        report.skipped_records += filtered.skipped;
        let in_window = filtered.records;

        self.cycle_time(&in_window, &mut report);
        self.time_to_first_review(&in_window, &mut report);
        self.review_density(&in_window, &mut report);
        self.merge_rate(&in_window, &mut report);
        self.size_distribution(&in_window, &mut report);

        report
    }

    fn cycle_time(&self, prs: &[&PullRequestRecord], report: &mut MetricReport) {
        let mut samples = Vec::new();
        for pr in prs {
            if !pr.is_merged() {
                continue;
            }
            match pr.cycle_time_hours() {
                Some(hours) => samples.push(hours),
                None => {
                    report.skipped_records += 1;
                    tracing::debug!(pr = pr.id, "merged PR without valid merge timestamp skipped");
                }
            }
        }

        let summary = summarize(&samples, &self.config.percentiles);
        report.insert(
            "cycle_time",
            MetricResult::from_summary(&summary, MetricUnit::Hours),
        );
    }

    fn time_to_first_review(&self, prs: &[&PullRequestRecord], report: &mut MetricReport) {
        let mut samples = Vec::new();
        for pr in prs {
            if pr.first_review_at.is_none() {
                continue;
            }
            match pr.time_to_first_review_hours() {
                Some(hours) => samples.push(hours),
                None => {
                    report.skipped_records += 1;
                    tracing::debug!(pr = pr.id, "first review precedes PR creation, skipped");
                }
            }
        }

        let summary = summarize(&samples, &self.config.percentiles);
        report.insert(
            "time_to_first_review",
            MetricResult::from_summary(&summary, MetricUnit::Hours),
        );
    }

    fn review_density(&self, prs: &[&PullRequestRecord], report: &mut MetricReport) {
        let comments: Vec<f64> = prs.iter().map(|pr| pr.review_comments as f64).collect();
        let unreviewed = prs.iter().filter(|pr| pr.review_comments == 0).count();

        let summary = summarize(&comments, &self.config.percentiles);
        report.insert(
            "review_density",
            MetricResult::from_summary(&summary, MetricUnit::Count)
                .with_secondary("prs_with_no_reviews", unreviewed as f64),
        );
    }

    /// Merged over merged-plus-closed-unmerged, as a percentage
    ///
    /// Open PRs are excluded from both sides: their fate is undetermined.
    fn merge_rate(&self, prs: &[&PullRequestRecord], report: &mut MetricReport) {
        let merged = prs.iter().filter(|pr| pr.is_merged()).count();
        let closed_unmerged = prs
            .iter()
            .filter(|pr| pr.state == PrState::Closed)
            .count();
        let open = prs.iter().filter(|pr| pr.state == PrState::Open).count();
        let decided = merged + closed_unmerged;

        let result = if decided == 0 {
            MetricResult::insufficient(MetricUnit::Percent)
        } else {
            MetricResult::new(
                merged as f64 / decided as f64 * 100.0,
                decided,
                MetricUnit::Percent,
            )
            .with_secondary(
                "rejection_rate",
                closed_unmerged as f64 / decided as f64 * 100.0,
            )
        };
        report.insert(
            "merge_rate",
            result
                .with_secondary("merged", merged as f64)
                .with_secondary("closed_unmerged", closed_unmerged as f64)
                .with_secondary("open", open as f64),
        );
    }

    fn size_distribution(&self, prs: &[&PullRequestRecord], report: &mut MetricReport) {
        let sizes: Vec<f64> = prs.iter().map(|pr| pr.size_lines() as f64).collect();

        let thresholds = &self.config.size_thresholds;
        let mut small = 0u64;
        let mut medium = 0u64;
        let mut large = 0u64;
        for pr in prs {
            match thresholds.bucket(pr.size_lines()) {
                "small" => small += 1,
                "medium" => medium += 1,
                _ => large += 1,
            }
        }

        let summary = summarize(&sizes, &self.config.percentiles);
        report.insert(
            "size_distribution",
            MetricResult::from_summary(&summary, MetricUnit::Lines)
                .with_secondary("small", small as f64)
                .with_secondary("medium", medium as f64)
                .with_secondary("large", large as f64),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn window_7d() -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        TimeWindow::new(start, start + Duration::days(7)).unwrap()
    }

    fn pr(id: u64, state: PrState, created_at: DateTime<Utc>) -> PullRequestRecord {
        PullRequestRecord {
            id,
            author: Identity::new("dev", "dev@x.com"),
            created_at,
            merged_at: None,
            closed_at: None,
            first_review_at: None,
            reviewers: vec![],
            review_comments: 0,
            additions: 0,
            deletions: 0,
            target_branch: "main".to_string(),
            state,
        }
    }

    #[test]
    fn unreviewed_merged_pr_counts_for_cycle_time_only() {
        // created at T, no review, merged at T+5h
        let config = EngineConfig::default();
        let created = window_7d().start() + Duration::hours(1);
        let mut record = pr(1, PrState::Merged, created);
        record.merged_at = Some(created + Duration::hours(5));
        record.closed_at = record.merged_at;

        let report = PrCycleAnalyzer::new(&config).analyze(&[record], &window_7d());

        let cycle = report.metric("cycle_time").unwrap();
        assert_eq!(cycle.sample_size, 1);
        assert_eq!(cycle.value, 5.0);

        let ttfr = report.metric("time_to_first_review").unwrap();
        assert_eq!(ttfr.sample_size, 0);
        assert!(ttfr.insufficient_data);
    }

    #[test]
    fn time_to_first_review_when_present() {
        let config = EngineConfig::default();
        let created = window_7d().start();
        let mut record = pr(1, PrState::Open, created);
        record.first_review_at = Some(created + Duration::hours(2));

        let report = PrCycleAnalyzer::new(&config).analyze(&[record], &window_7d());
        let ttfr = report.metric("time_to_first_review").unwrap();
        assert_eq!(ttfr.sample_size, 1);
        assert_eq!(ttfr.value, 2.0);
    }

    #[test]
    fn merge_rate_excludes_open_prs() {
        let config = EngineConfig::default();
        let start = window_7d().start();

        let mut merged = pr(1, PrState::Merged, start);
        merged.merged_at = Some(start + Duration::hours(1));
        merged.closed_at = merged.merged_at;
        let mut rejected = pr(2, PrState::Closed, start + Duration::hours(1));
        rejected.closed_at = Some(start + Duration::hours(2));
        let open = pr(3, PrState::Open, start + Duration::hours(2));

        let report =
            PrCycleAnalyzer::new(&config).analyze(&[merged, rejected, open], &window_7d());
        let rate = report.metric("merge_rate").unwrap();
        assert_eq!(rate.value, 50.0);
        assert_eq!(rate.sample_size, 2);
        assert_eq!(rate.secondary["open"], 1.0);
        assert_eq!(rate.secondary["rejection_rate"], 50.0);
    }

    #[test]
    fn merge_rate_with_only_open_prs_is_insufficient() {
        let config = EngineConfig::default();
        let record = pr(1, PrState::Open, window_7d().start());

        let report = PrCycleAnalyzer::new(&config).analyze(&[record], &window_7d());
        assert!(report.metric("merge_rate").unwrap().insufficient_data);
    }

    #[test]
    fn size_buckets_use_configured_thresholds() {
        let config = EngineConfig::default();
        let start = window_7d().start();

        let mut tiny = pr(1, PrState::Open, start);
        tiny.additions = 10;
        let mut mid = pr(2, PrState::Open, start);
        mid.additions = 200;
        mid.deletions = 50;
        let mut big = pr(3, PrState::Open, start);
        big.additions = 900;

        let report = PrCycleAnalyzer::new(&config).analyze(&[tiny, mid, big], &window_7d());
        let size = report.metric("size_distribution").unwrap();
        assert_eq!(size.secondary["small"], 1.0);
        assert_eq!(size.secondary["medium"], 1.0);
        assert_eq!(size.secondary["large"], 1.0);
        assert_eq!(size.sample_size, 3);
    }

    #[test]
    fn review_density_counts_unreviewed() {
        let config = EngineConfig::default();
        let start = window_7d().start();

        let silent = pr(1, PrState::Open, start);
        let mut busy = pr(2, PrState::Open, start);
        busy.review_comments = 6;

        let report = PrCycleAnalyzer::new(&config).analyze(&[silent, busy], &window_7d());
        let density = report.metric("review_density").unwrap();
        assert_eq!(density.value, 3.0);
        assert_eq!(density.secondary["prs_with_no_reviews"], 1.0);
    }
}
