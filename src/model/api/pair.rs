use serde::{Deserialize, Serialize};

use crate::model::{
    api::{group::GroupView, vote::VoteView},
    common::pair_text::PairTextFormat,
    db::Pair,
    mongodb::Id,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairView {
    pub id: Id,
    pub option_a: String,
    pub option_b: String,
    pub poll_id: Id,
    pub group_id: Option<Id>,
}

impl From<Pair> for PairView {
    fn from(pair: Pair) -> Self {
        Self {
            id: pair.id,
            option_a: pair.option_a,
            option_b: pair.option_b,
            poll_id: pair.poll_id,
            group_id: pair.group_id,
        }
    }
}

/// A pair in the admin listing, with its votes and its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairDetail {
    #[serde(flatten)]
    pub pair: PairView,
    pub votes: Vec<VoteView>,
    pub group: Option<GroupView>,
}

/// Optional filters on the admin pair listing.
///
/// Values that are not valid IDs are ignored rather than rejected.
#[derive(Debug, Clone, Default, FromForm)]
pub struct PairFilter {
    #[field(name = "pollId")]
    pub poll_id: Option<Id>,
    #[field(name = "groupId")]
    pub group_id: Option<Id>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPairRequest {
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub group_id: Option<Id>,
    pub poll_id: Option<Id>,
}

/// Pasted text to be split into pairs and added to a poll or group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPairsRequest {
    pub pairs_text: Option<String>,
    pub poll_id: Option<Id>,
    pub group_id: Option<Id>,
    #[serde(default)]
    pub format: PairTextFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkPairsResponse {
    pub pairs: Vec<PairView>,
}
