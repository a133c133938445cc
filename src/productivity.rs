//! Per-developer and per-team activity and collaboration metrics

use crate::config::EngineConfig;
use crate::models::{CommitRecord, PullRequestRecord};
use crate::report::{MetricReport, MetricResult, MetricUnit, ReportSection};
use crate::window::{filter_window, TimeWindow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket name for developers not present in any configured team
pub const UNASSIGNED_TEAM: &str = "unassigned";

/// Activity totals for one developer (keyed by normalized identity)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeveloperActivity {
    /// Display name as last seen in the records
    pub display_name: String,
    pub commits: u64,
    pub pull_requests: u64,
    pub additions: u64,
    pub deletions: u64,
}

/// A directed author/reviewer pairing with its occurrence count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationPair {
    pub author: String,
    pub reviewer: String,
    pub reviews: u64,
}

/// Activity rollup for one team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamActivity {
    pub commits: u64,
    pub pull_requests: u64,
    pub developers: u64,
}

/// Structured per-developer detail attached to the productivity report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductivityBreakdown {
    pub developers: BTreeMap<String, DeveloperActivity>,
    pub collaboration_pairs: Vec<CollaborationPair>,
    pub teams: BTreeMap<String, TeamActivity>,
}

/// Computes developer activity, collaboration pairs and team rollups
pub struct ProductivityAnalyzer<'a> {
    config: &'a EngineConfig,
}

impl<'a> ProductivityAnalyzer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn analyze(
        &self,
        commits: &[CommitRecord],
        pull_requests: &[PullRequestRecord],
        window: &TimeWindow,
    ) -> MetricReport {
        let mut report = MetricReport::new(ReportSection::Productivity, window);

        let commits = filter_window(commits, window);
        report.skipped_records += commits.skipped;
        let prs = filter_window(pull_requests, window);
        report.skipped_records += prs.skipped;

        let mut developers: BTreeMap<String, DeveloperActivity> = BTreeMap::new();
        let mut commit_authors = 0usize;
        for commit in &commits.records {
            let entry = developers
                .entry(commit.author.normalized_key())
                .or_default();
            if entry.commits == 0 {
                commit_authors += 1;
            }
            entry.display_name = commit.author.name.clone();
            entry.commits += 1;
            entry.additions += commit.additions;
            entry.deletions += commit.deletions;
        }

        let mut pr_authors = 0usize;
        for pr in &prs.records {
            let entry = developers.entry(pr.author.normalized_key()).or_default();
            if entry.pull_requests == 0 {
                pr_authors += 1;
            }
            if entry.display_name.is_empty() {
                entry.display_name = pr.author.name.clone();
            }
            entry.pull_requests += 1;
        }

        let collaboration_pairs = self.collaboration_pairs(&prs.records, &mut report);
        let teams = self.team_rollup(&developers);

        let total_commits = commits.records.len();
        let total_prs = prs.records.len();
        report.insert(
            "total_commits",
            MetricResult::new(total_commits as f64, total_commits, MetricUnit::Count),
        );
        report.insert(
            "total_pull_requests",
            MetricResult::new(total_prs as f64, total_prs, MetricUnit::Count),
        );
        report.insert(
            "active_developers",
            MetricResult::new(developers.len() as f64, developers.len(), MetricUnit::Count),
        );
        report.insert(
            "mean_commits_per_author",
            mean_per_author(total_commits, commit_authors),
        );
        report.insert(
            "mean_prs_per_author",
            mean_per_author(total_prs, pr_authors),
        );

        let breakdown = ProductivityBreakdown {
            developers,
            collaboration_pairs,
            teams,
        };
        report.data = serde_json::to_value(&breakdown).unwrap_or(serde_json::Value::Null);
        report
    }

    /// Distinct (author, reviewer) pairs with counts, self-reviews excluded
    fn collaboration_pairs(
        &self,
        prs: &[&PullRequestRecord],
        report: &mut MetricReport,
    ) -> Vec<CollaborationPair> {
        let mut pair_counts: BTreeMap<(String, String), u64> = BTreeMap::new();
        let mut reviewer_keys: BTreeMap<String, u64> = BTreeMap::new();
        let mut total_reviewers = 0usize;

        for pr in prs {
            let author_key = pr.author.normalized_key();
            total_reviewers += pr.reviewers.len();
            for reviewer in &pr.reviewers {
                let reviewer_key = reviewer.normalized_key();
                *reviewer_keys.entry(reviewer_key.clone()).or_default() += 1;
                if reviewer_key == author_key {
                    continue;
                }
                *pair_counts.entry((author_key.clone(), reviewer_key)).or_default() += 1;
            }
        }

        let mean_reviewers_per_pr = if prs.is_empty() {
            MetricResult::insufficient(MetricUnit::Count)
        } else {
            MetricResult::new(
                total_reviewers as f64 / prs.len() as f64,
                prs.len(),
                MetricUnit::Count,
            )
        };
        report.insert("mean_reviewers_per_pr", mean_reviewers_per_pr);
        report.insert(
            "distinct_reviewers",
            MetricResult::new(
                reviewer_keys.len() as f64,
                reviewer_keys.len(),
                MetricUnit::Count,
            ),
        );
        report.insert(
            "collaboration_pairs",
            MetricResult::new(pair_counts.len() as f64, pair_counts.len(), MetricUnit::Count),
        );

        let mut pairs: Vec<CollaborationPair> = pair_counts
            .into_iter()
            .map(|((author, reviewer), reviews)| CollaborationPair {
                author,
                reviewer,
                reviews,
            })
            .collect();
        pairs.sort_by(|a, b| b.reviews.cmp(&a.reviews));
        pairs
    }

    /// Sum developer activity per configured team
    ///
    /// Developers absent from every team list land in the `unassigned`
    /// bucket rather than being dropped.
    fn team_rollup(
        &self,
        developers: &BTreeMap<String, DeveloperActivity>,
    ) -> BTreeMap<String, TeamActivity> {
        if self.config.teams.is_empty() {
            return BTreeMap::new();
        }

        let mut member_to_team: BTreeMap<String, &str> = BTreeMap::new();
        for (team, members) in &self.config.teams {
            for member in members {
                member_to_team.insert(member.trim().to_lowercase(), team.as_str());
            }
        }

        let mut teams: BTreeMap<String, TeamActivity> = BTreeMap::new();
        for (key, activity) in developers {
            let team = member_to_team
                .get(key)
                .copied()
                .unwrap_or(UNASSIGNED_TEAM);
            let entry = teams.entry(team.to_string()).or_default();
            entry.commits += activity.commits;
            entry.pull_requests += activity.pull_requests;
            entry.developers += 1;
        }
        teams
    }
}

fn mean_per_author(total: usize, authors: usize) -> MetricResult {
    if authors == 0 {
        MetricResult::insufficient(MetricUnit::Count)
    } else {
        MetricResult::new(total as f64 / authors as f64, authors, MetricUnit::Count)
    }
}
