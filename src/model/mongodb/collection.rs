use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{Group, Pair, Poll, Vote, Voter};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.guard::<&State<Database>>().await.succeeded() {
            Some(db) => request::Outcome::Success(Coll::from_db(db)),
            None => {
                error!("Database is not managed; was the MongoDB fairing attached?");
                request::Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

impl MongoCollection for Poll {
    const NAME: &'static str = "polls";
}

impl MongoCollection for Group {
    const NAME: &'static str = "groups";
}

impl MongoCollection for Pair {
    const NAME: &'static str = "pairs";
}

impl MongoCollection for Voter {
    const NAME: &'static str = "voters";
}

impl MongoCollection for Vote {
    const NAME: &'static str = "votes";
}

impl MongoCollection for Counter {
    const NAME: &'static str = "counters";
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Voter identifiers are handed out as unique ballot references.
    let voter_identifier = IndexModel::builder()
        .keys(doc! {"identifier": 1})
        .options(unique)
        .build();
    let voter_poll = IndexModel::builder().keys(doc! {"poll_id": 1}).build();
    Coll::<Voter>::from_db(db)
        .create_indexes([voter_identifier, voter_poll], None)
        .await?;

    // Groups are always listed per poll.
    let group_poll = IndexModel::builder().keys(doc! {"poll_id": 1}).build();
    Coll::<Group>::from_db(db)
        .create_index(group_poll, None)
        .await?;

    // Pairs are filtered by poll and by group.
    let pair_poll = IndexModel::builder().keys(doc! {"poll_id": 1}).build();
    let pair_group = IndexModel::builder().keys(doc! {"group_id": 1}).build();
    Coll::<Pair>::from_db(db)
        .create_indexes([pair_poll, pair_group], None)
        .await?;

    // Votes are tallied per pair and deleted per voter.
    let vote_pair = IndexModel::builder().keys(doc! {"pair_id": 1}).build();
    let vote_voter = IndexModel::builder().keys(doc! {"voter_id": 1}).build();
    Coll::<Vote>::from_db(db)
        .create_indexes([vote_pair, vote_voter], None)
        .await?;

    Ok(())
}
