use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where a deployment event came from
///
/// When a repository emits no genuine deployment or release events, merged
/// PRs into the default branch serve as a documented proxy. The report always
/// states which source was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeploymentSource {
    /// An actual deployment event
    Deployment,
    /// A published release
    Release,
    /// Merged PR into the default branch, used as a proxy
    MergedPrProxy,
}

impl DeploymentSource {
    /// Whether this is a genuine deployment signal (not a proxy)
    pub fn is_genuine(&self) -> bool {
        !matches!(self, DeploymentSource::MergedPrProxy)
    }
}

/// A normalized deployment-like event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentEvent {
    /// Event timestamp
    pub deployed_at: DateTime<Utc>,

    /// Event source
    pub source: DeploymentSource,

    /// Repository the event belongs to ("owner/name")
    pub repository: String,

    /// Success/failure outcome, when the source system reports one
    pub succeeded: Option<bool>,
}
