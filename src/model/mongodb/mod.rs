mod collection;
mod counter;
mod id;

pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::Counter;
pub use id::{parse_id, Id, IdParam};
