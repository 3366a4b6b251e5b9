use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

use mongodb::bson::{doc, Bson, Document};
use rocket::{
    form::{self, FromFormField, ValueField},
    request::FromParam,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An integer record ID, allocated from a per-collection [`Counter`](super::Counter).
///
/// Serializes as a bare number both in the database and over the API.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(u32);

impl Id {
    /// A filter document matching the record with this ID.
    pub fn as_doc(&self) -> Document {
        doc! { "_id": *self }
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<u32>()?))
    }
}

impl From<u32> for Id {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Id> for Bson {
    fn from(id: Id) -> Self {
        Bson::Int64(id.0.into())
    }
}

impl<'a> FromParam<'a> for Id {
    type Error = ParseIntError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse::<Id>()
    }
}

/// A path segment that may or may not have parsed as an [`Id`].
///
/// Routes take this instead of a bare `Id` so a malformed ID is reported
/// as a bad request rather than falling through to an unmatched route.
pub type IdParam = Result<Id, ParseIntError>;

/// Turn a raw path parameter into an [`Id`], naming the record kind in the error.
pub fn parse_id(param: IdParam, kind: &str) -> Result<Id, Error> {
    param.map_err(|_| Error::bad_request(format!("Invalid {kind} ID")))
}

#[rocket::async_trait]
impl<'r> FromFormField<'r> for Id {
    fn from_value(field: ValueField<'r>) -> form::Result<'r, Self> {
        Ok(Self(u32::from_value(field)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_params() {
        assert_eq!(Id::from_param("42").unwrap(), Id::from(42));
        assert!(Id::from_param("forty-two").is_err());
        assert!(Id::from_param("-1").is_err());

        let err = parse_id("x".parse::<Id>(), "poll").unwrap_err();
        assert_eq!(err.to_string(), "Invalid poll ID");
    }

    #[test]
    fn filter_document() {
        assert_eq!(Id::from(7).as_doc(), doc! { "_id": 7_i64 });
    }
}
