use crate::models::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Pull request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PrState {
    Open,
    Merged,
    /// Closed without merging
    Closed,
}

/// A normalized pull request record
///
/// Produced by an external collector; the engine only reads it. Timestamps
/// for events that may not have happened yet (merge, close, first review)
/// are explicitly optional. Invariants (merged_at >= created_at, and likewise
/// for first_review_at) are expected but not enforced: a violating record is
/// excluded from the affected metric like any other malformed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// Source-system identifier (PR number)
    pub id: u64,

    /// PR author
    pub author: Identity,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Merge timestamp, if merged
    pub merged_at: Option<DateTime<Utc>>,

    /// Close timestamp, if closed (merged PRs are also closed)
    pub closed_at: Option<DateTime<Utc>>,

    /// Timestamp of the first review activity, if any
    pub first_review_at: Option<DateTime<Utc>>,

    /// Reviewers with at least one review on this PR
    pub reviewers: Vec<Identity>,

    /// Total review comment count
    pub review_comments: u64,

    /// Lines added
    pub additions: u64,

    /// Lines removed
    pub deletions: u64,

    /// Target branch name
    pub target_branch: String,

    /// Lifecycle state
    pub state: PrState,
}

impl PullRequestRecord {
    /// Whether this PR was merged
    pub fn is_merged(&self) -> bool {
        self.state == PrState::Merged && self.merged_at.is_some()
    }

    /// Total changed lines (additions + deletions)
    pub fn size_lines(&self) -> u64 {
        self.additions + self.deletions
    }

    /// Creation-to-merge duration in hours, for well-formed merged PRs
    ///
    /// Returns `None` for unmerged PRs and for records violating the
    /// merged_at >= created_at invariant.
    pub fn cycle_time_hours(&self) -> Option<f64> {
        let merged_at = self.merged_at?;
        duration_hours(self.created_at, merged_at)
    }

    /// Creation-to-first-review duration in hours, when a review exists
    pub fn time_to_first_review_hours(&self) -> Option<f64> {
        let first_review_at = self.first_review_at?;
        duration_hours(self.created_at, first_review_at)
    }
}

/// Non-negative duration between two instants, in hours
fn duration_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<f64> {
    let seconds = to.signed_duration_since(from).num_seconds();
    if seconds < 0 {
        return None;
    }
    Some(seconds as f64 / 3600.0)
}
