use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::{Coll, Id, MongoCollection};

/// A counter object used to implement auto-increment IDs, one per collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    /// Name of the collection whose IDs this counter allocates.
    #[serde(rename = "_id")]
    pub id: String,
    /// The most recently allocated ID.
    pub last: u32,
}

impl Counter {
    /// Atomically allocate the next ID for records of type `T`.
    pub async fn next<T: MongoCollection>(counters: &Coll<Counter>) -> Result<Id> {
        let ids = Self::reserve::<T>(counters, 1).await?;
        Ok(ids[0])
    }

    /// Atomically allocate `count` consecutive IDs for records of type `T`.
    ///
    /// The counter is created on first use, so the first ID ever handed out is 1.
    ///
    /// Never call this inside a transaction: every writer of a collection
    /// shares one counter document, so concurrent transactions would conflict
    /// on it. IDs of an aborted transaction are simply skipped.
    pub async fn reserve<T: MongoCollection>(
        counters: &Coll<Counter>,
        count: u32,
    ) -> Result<Vec<Id>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let filter = doc! { "_id": T::NAME };
        let update = doc! {
            "$inc": { "last": i64::from(count) }
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = counters
            .find_one_and_update(filter, update, options)
            .await?
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    format!("Failed to allocate IDs for {}", T::NAME),
                )
            })?;

        let first = counter.last - count + 1;
        Ok((first..=counter.last).map(Id::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::db::Poll;

    #[backend_test]
    async fn counter_increment(counters: Coll<Counter>) {
        // The first allocation creates the counter.
        let first = Counter::next::<Poll>(&counters).await.unwrap();
        assert_eq!(first, Id::from(1));

        // Reserving a block continues from there.
        let block = Counter::reserve::<Poll>(&counters, 3).await.unwrap();
        assert_eq!(block, vec![Id::from(2), Id::from(3), Id::from(4)]);

        // Reserving nothing touches nothing.
        let none = Counter::reserve::<Poll>(&counters, 0).await.unwrap();
        assert!(none.is_empty());
        let counter = counters
            .find_one(doc! { "_id": Poll::NAME }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(counter.last, 4);
    }
}
