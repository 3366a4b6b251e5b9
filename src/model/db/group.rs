use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// A named bucket of pairs within a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    pub poll_id: Id,
}

/// Title given to groups the server creates on an admin's behalf.
pub const DEFAULT_GROUP_TITLE: &str = "Default Group";

impl Group {
    pub fn new(id: Id, title: impl Into<String>, poll_id: Id) -> Self {
        Self {
            id,
            title: title.into(),
            poll_id,
        }
    }

    /// The catch-all group for pairs imported without a group.
    pub fn default_for(id: Id, poll_id: Id) -> Self {
        Self::new(id, DEFAULT_GROUP_TITLE, poll_id)
    }
}
