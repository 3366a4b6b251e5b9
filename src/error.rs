use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Catcher, Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    pub fn unauthorized() -> Self {
        Self::Status(Status::Unauthorized, "Unauthorized".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Status(Status::NotFound, message.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) => Status::InternalServerError,
            Self::Status(status, _) => *status,
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let message = match self {
            Self::Db(err) => {
                // Driver errors can leak internals, so only the log sees them.
                error!("Database error: {err}");
                "Database error".to_string()
            }
            Self::Status(_, message) => {
                if status.code >= 500 {
                    error!("{message}");
                } else {
                    debug!("{status}: {message}");
                }
                message
            }
        };
        (status, Json(ErrorBody::new(message))).respond_to(req)
    }
}

/// Render failures that never reached a handler (guards, unmatched routes,
/// malformed bodies) in the same shape as handler errors.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> (Status, Json<ErrorBody>) {
    let message = status.reason().unwrap_or("Unknown error");
    (status, Json(ErrorBody::new(message)))
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}
