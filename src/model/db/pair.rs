use serde::{Deserialize, Serialize};

use crate::model::{common::pair_text::OptionPair, mongodb::Id};

/// A two-option choice within a poll, optionally placed in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    #[serde(rename = "_id")]
    pub id: Id,
    pub option_a: String,
    pub option_b: String,
    pub poll_id: Id,
    pub group_id: Option<Id>,
}

impl Pair {
    pub fn new(id: Id, options: OptionPair, poll_id: Id, group_id: Option<Id>) -> Self {
        Self {
            id,
            option_a: options.option_a,
            option_b: options.option_b,
            poll_id,
            group_id,
        }
    }
}
