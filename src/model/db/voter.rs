use chrono::{DateTime, Utc};
use mongodb::bson::{self, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::mongodb::Id;

/// Someone who submitted a ballot for a poll.
///
/// A fresh voter is created for every submission; names are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    /// Random unique reference for this submission.
    pub identifier: String,
    pub poll_id: Id,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Voter {
    /// Create a voter with a newly generated identifier.
    pub fn new(id: Id, name: impl Into<String>, poll_id: Id) -> Self {
        Self {
            id,
            name: name.into(),
            identifier: Uuid::new_v4().to_string(),
            poll_id,
            created_at: bson::DateTime::now().to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_unique() {
        let poll_id = Id::from(1);
        let first = Voter::new(Id::from(1), "Ada", poll_id);
        let second = Voter::new(Id::from(2), "Ada", poll_id);
        assert_ne!(first.identifier, second.identifier);
        assert!(Uuid::parse_str(&first.identifier).is_ok());
    }
}
