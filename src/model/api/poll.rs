use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::{group::GroupDetail, pair::PairView, vote::VoteView},
    common::tally::Tally,
    db::Poll,
    mongodb::Id,
};

/// A poll as returned over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: Id,
    pub title: String,
    pub is_active: bool,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Poll> for PollView {
    fn from(poll: Poll) -> Self {
        Self {
            id: poll.id,
            title: poll.title,
            is_active: poll.is_active,
            is_closed: poll.is_closed,
            created_at: poll.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollCounts {
    pub pairs: u64,
    pub voters: u64,
}

/// A poll in the admin listing, with the number of pairs and voters it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSummary {
    #[serde(flatten)]
    pub poll: PollView,
    #[serde(rename = "_count")]
    pub count: PollCounts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPollRequest {
    pub title: Option<String>,
}

/// The poll currently open for voting, with everything the ballot form shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePoll {
    #[serde(flatten)]
    pub poll: PollView,
    /// Every pair of the poll, grouped or not.
    pub pairs: Vec<PairView>,
    pub groups: Vec<GroupDetail>,
}

/// A pair with its votes and their tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairResult {
    #[serde(flatten)]
    pub pair: PairView,
    pub votes: Vec<VoteView>,
    pub tally: Tally,
}

/// A poll with the results of each of its pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResults {
    #[serde(flatten)]
    pub poll: PollView,
    pub pairs: Vec<PairResult>,
}
