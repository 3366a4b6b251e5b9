use serde::{Deserialize, Serialize};

use crate::model::{api::pair::PairView, db::Group, mongodb::Id};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: Id,
    pub title: String,
    pub poll_id: Id,
}

impl From<Group> for GroupView {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            poll_id: group.poll_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounts {
    pub pairs: u64,
}

/// A group with the pairs it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: GroupView,
    pub pairs: Vec<PairView>,
    #[serde(rename = "_count")]
    pub count: GroupCounts,
}

impl GroupDetail {
    pub fn new(group: Group, pairs: Vec<PairView>) -> Self {
        let count = GroupCounts {
            pairs: pairs.len() as u64,
        };
        Self {
            group: group.into(),
            pairs,
            count,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGroupRequest {
    pub title: Option<String>,
}
