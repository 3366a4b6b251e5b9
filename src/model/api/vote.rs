use serde::{Deserialize, Serialize};

use crate::model::{db::Vote, mongodb::Id};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteView {
    pub id: Id,
    pub selection: String,
    pub pair_id: Id,
    pub voter_id: Id,
}

impl From<Vote> for VoteView {
    fn from(vote: Vote) -> Self {
        Self {
            id: vote.id,
            selection: vote.selection,
            pair_id: vote.pair_id,
            voter_id: vote.voter_id,
        }
    }
}

/// One selection on a submitted ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotEntry {
    pub pair_id: Id,
    pub selection: String,
}

/// A voter's full submission for a poll.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotRequest {
    pub voter_name: Option<String>,
    pub poll_id: Option<Id>,
    #[serde(default)]
    pub votes: Vec<BallotEntry>,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl BallotRequest {
        pub fn example(poll_id: Id, votes: &[(Id, &str)]) -> Self {
            Self {
                voter_name: Some("Ada".to_string()),
                poll_id: Some(poll_id),
                votes: votes
                    .iter()
                    .map(|(pair_id, selection)| BallotEntry {
                        pair_id: *pair_id,
                        selection: selection.to_string(),
                    })
                    .collect(),
            }
        }
    }
}
