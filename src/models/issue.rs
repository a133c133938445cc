use crate::models::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized issue record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Source-system identifier (issue number)
    pub id: u64,

    /// Label tags, used to classify bug/incident issues
    pub labels: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Close timestamp, if closed
    pub closed_at: Option<DateTime<Utc>>,

    /// Issue author
    pub author: Identity,
}

impl IssueRecord {
    /// Whether any label matches one of the given bug labels, case-insensitively
    pub fn is_bug(&self, bug_labels: &[String]) -> bool {
        self.labels.iter().any(|label| {
            bug_labels
                .iter()
                .any(|bug| label.eq_ignore_ascii_case(bug))
        })
    }

    /// Whether the issue is closed
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Creation-to-close duration in hours, for well-formed closed issues
    pub fn resolution_hours(&self) -> Option<f64> {
        let closed_at = self.closed_at?;
        let seconds = closed_at.signed_duration_since(self.created_at).num_seconds();
        if seconds < 0 {
            return None;
        }
        Some(seconds as f64 / 3600.0)
    }
}
