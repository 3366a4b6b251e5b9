//! Logic shared between the database records and the API views.

pub mod pair_text;
pub mod tally;
