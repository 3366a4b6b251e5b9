use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::{pair::PairView, vote::VoteView},
    db::Voter,
    mongodb::Id,
};

/// A vote together with the pair it was cast on, if that pair still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteWithPair {
    #[serde(flatten)]
    pub vote: VoteView,
    pub pair: Option<PairView>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCounts {
    pub votes: u64,
}

/// A voter in the admin listing, with everything they voted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterDetail {
    pub id: Id,
    pub name: String,
    pub identifier: String,
    pub poll_id: Id,
    pub created_at: DateTime<Utc>,
    pub votes: Vec<VoteWithPair>,
    #[serde(rename = "_count")]
    pub count: VoterCounts,
}

impl VoterDetail {
    pub fn new(voter: Voter, votes: Vec<VoteWithPair>) -> Self {
        let count = VoterCounts {
            votes: votes.len() as u64,
        };
        Self {
            id: voter.id,
            name: voter.name,
            identifier: voter.identifier,
            poll_id: voter.poll_id,
            created_at: voter.created_at,
            votes,
            count,
        }
    }
}
