//! DB-compatible (e.g. de/serialisable) types.
//!
//! Records reference each other by integer [`Id`](crate::model::mongodb::Id),
//! and datetimes are serialised in MongoDB's own format.

mod group;
pub use group::{Group, DEFAULT_GROUP_TITLE};

mod pair;
pub use pair::Pair;

mod poll;
pub use poll::Poll;

mod vote;
pub use vote::Vote;

mod voter;
pub use voter::Voter;
