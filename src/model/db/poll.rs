use chrono::{DateTime, Utc};
use mongodb::bson::{self, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// A poll: the unit that owns groups, pairs and voters.
///
/// At most one poll is active at a time; a closed poll accepts no more ballots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    pub is_active: bool,
    pub is_closed: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Poll {
    /// A new poll, neither active nor closed.
    pub fn new(id: Id, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            is_active: false,
            is_closed: false,
            // Truncated to the millisecond precision the database stores.
            created_at: bson::DateTime::now().to_chrono(),
        }
    }

    /// Whether this poll still accepts ballots.
    pub fn is_open(&self) -> bool {
        !self.is_closed
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Poll {
        pub fn example() -> Self {
            Self::new(Id::from(1), "Snack Preferences")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_polls_are_inactive_and_open() {
        let poll = Poll::example();
        assert!(!poll.is_active);
        assert!(poll.is_open());

        let closed = Poll {
            is_closed: true,
            ..poll
        };
        assert!(!closed.is_open());
    }
}
