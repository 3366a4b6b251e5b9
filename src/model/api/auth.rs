use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;

/// Name of the header carrying the admin credential.
pub const AUTHORIZATION: &str = "Authorization";

/// Whether `header` grants admin rights under `config`.
///
/// The credential is compared as a literal string; nothing is decoded.
pub fn is_admin(header: Option<&str>, config: &Config) -> bool {
    header.map_or(false, |value| value == config.admin_authorization())
}

/// Proof that the request carried the admin credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admin;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Admin {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<Config>>().await.succeeded() {
            Some(config) => config,
            None => {
                error!("Config is not managed; was the config fairing attached?");
                return Outcome::Error((
                    Status::InternalServerError,
                    Error::Status(Status::InternalServerError, "Missing config".to_string()),
                ));
            }
        };

        let header = req.headers().get_one(AUTHORIZATION);
        if is_admin(header, config) {
            Outcome::Success(Admin)
        } else {
            warn!(
                "Rejected admin request to {} ({} credential)",
                req.uri(),
                if header.is_some() { "wrong" } else { "no" }
            );
            Outcome::Error((Status::Unauthorized, Error::unauthorized()))
        }
    }
}

/// Response body for a successful credential probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_comparison() {
        let config = Config::example();
        assert!(is_admin(Some("Basic myplainTextAdminCreds"), &config));
        assert!(!is_admin(Some("myplainTextAdminCreds"), &config));
        assert!(!is_admin(Some("Basic bXlwbGFpblRleHRBZG1pbkNyZWRz"), &config));
        assert!(!is_admin(Some("basic myplainTextAdminCreds"), &config));
        assert!(!is_admin(Some(""), &config));
        assert!(!is_admin(None, &config));
    }
}
