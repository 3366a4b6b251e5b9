use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// One voter's selection on one pair.
///
/// `selection` is expected to equal one of the pair's options, but the
/// ballot form is the only thing that ensures it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    pub selection: String,
    pub pair_id: Id,
    pub voter_id: Id,
}

impl Vote {
    pub fn new(id: Id, selection: impl Into<String>, pair_id: Id, voter_id: Id) -> Self {
        Self {
            id,
            selection: selection.into(),
            pair_id,
            voter_id,
        }
    }
}
