use mongodb::{
    bson::{doc, Bson, Document},
    ClientSession,
};

use crate::error::{Error, Result};
use crate::model::{
    db::{Group, Pair, Poll, Vote, Voter},
    mongodb::{Coll, Id},
};

/// Look up a poll, failing with 404 if it does not exist.
pub async fn find_poll(polls: &Coll<Poll>, poll_id: Id) -> Result<Poll> {
    polls
        .find_one(poll_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Poll not found"))
}

/// Look up a group, failing with 404 if it does not exist.
pub async fn find_group(groups: &Coll<Group>, group_id: Id) -> Result<Group> {
    groups
        .find_one(group_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Group not found"))
}

/// A filter matching any of the given values of `field`.
pub fn any_of(field: &str, values: impl IntoIterator<Item = impl Into<Bson>>) -> Document {
    let values = values.into_iter().map(Into::into).collect::<Vec<Bson>>();
    let mut filter = Document::new();
    filter.insert(field, doc! { "$in": values });
    filter
}

/// Delete the pairs matching `filter` along with every vote cast on them.
///
/// Returns the number of pairs deleted.
pub async fn delete_pairs_cascade(
    pairs: &Coll<Pair>,
    votes: &Coll<Vote>,
    filter: Document,
    session: &mut ClientSession,
) -> Result<u64> {
    let pair_ids = pairs
        .distinct_with_session("_id", filter.clone(), None, session)
        .await?;
    votes
        .delete_many_with_session(any_of("pair_id", pair_ids), None, session)
        .await?;
    let result = pairs
        .delete_many_with_session(filter, None, session)
        .await?;
    Ok(result.deleted_count)
}

/// Delete the voters matching `filter` along with every vote they cast.
///
/// Returns the number of voters deleted.
pub async fn delete_voters_cascade(
    voters: &Coll<Voter>,
    votes: &Coll<Vote>,
    filter: Document,
    session: &mut ClientSession,
) -> Result<u64> {
    let voter_ids = voters
        .distinct_with_session("_id", filter.clone(), None, session)
        .await?;
    votes
        .delete_many_with_session(any_of("voter_id", voter_ids), None, session)
        .await?;
    let result = voters
        .delete_many_with_session(filter, None, session)
        .await?;
    Ok(result.deleted_count)
}
