use crate::models::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized commit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit author (name + email)
    pub author: Identity,

    /// Authored timestamp
    pub authored_at: DateTime<Utc>,

    /// Repository the commit belongs to ("owner/name")
    pub repository: String,

    /// Lines added
    pub additions: u64,

    /// Lines removed
    pub deletions: u64,
}

impl CommitRecord {
    /// Total changed lines (additions + deletions)
    pub fn total_changes(&self) -> u64 {
        self.additions + self.deletions
    }
}
