//! Data types for polls and ballots.
//!
//! - [`db`] holds the records exactly as stored in MongoDB.
//! - [`api`] holds request bodies and the JSON views returned to clients.
//! - [`common`] holds logic shared by both, such as tallying and text import.

pub mod api;
pub mod common;
pub mod db;
pub mod mongodb;
