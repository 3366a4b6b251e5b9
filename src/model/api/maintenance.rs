use serde::{Deserialize, Serialize};

use crate::model::{
    api::{pair::PairView, poll::PollView},
    mongodb::Id,
};

/// The freshly seeded default poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seeded {
    pub poll: PollView,
    pub pairs: Vec<PairView>,
}

/// What the group migration did to one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigratedPoll {
    pub poll_id: Id,
    pub group_id: Id,
    /// Number of previously ungrouped pairs moved into the new group.
    pub pairs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub polls: Vec<MigratedPoll>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInfo {
    pub pair_count: u64,
}

/// Result of the database connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStatus {
    pub status: String,
    pub message: String,
    pub db_info: DbInfo,
}
