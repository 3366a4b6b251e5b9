use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Header, StatusClass},
    Data, Orbit, Request, Response, Rocket,
};

/// A unique identifier for a particular request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. This wraps around back to zero if you somehow exceed a usize.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// When a request arrived, for timing its response.
#[derive(Debug, Copy, Clone)]
struct RequestStart(Instant);

impl RequestStart {
    fn now() -> RequestStart {
        RequestStart(Instant::now())
    }

    fn elapsed_ms(&self) -> u128 {
        self.0.elapsed().as_millis()
    }
}

/// Response header carrying the ID used in the server log for this request.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// A rocket fairing that logs every request and response, tagged with a request ID
/// that is also returned to the client.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let protocol = if rocket.config().tls_enabled() {
            "https"
        } else {
            "http"
        };
        let ip = &rocket.config().address;
        let port = &rocket.config().port;
        info!("Server launched on {protocol}://{ip}:{port}");
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        // Tag and time the request.
        let id = req.local_cache(RequestId::next);
        req.local_cache(RequestStart::now);

        let method = req.method();
        let uri = req.uri();
        let admin = if uri.path().as_str().starts_with(ADMIN_PREFIX) {
            " [admin]"
        } else {
            ""
        };
        info!("->req{id} {method} {uri}{admin}");
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = req.local_cache(RequestId::next);
        let elapsed = req.local_cache(RequestStart::now).elapsed_ms();
        res.set_header(Header::new(REQUEST_ID_HEADER, id.to_string()));

        // Name the handler, if any matched.
        let code = res.status();
        let route = match req.route() {
            Some(r) => match r.name {
                Some(ref name) => format!("{name} ({})", r.uri),
                None => r.uri.to_string(),
            },
            None => "UNKNOWN ROUTE".to_string(),
        };
        let log_msg = format!("<-rsp{id} {code} {route} in {elapsed}ms");
        match code.class() {
            StatusClass::ServerError => error!("{log_msg}"),
            StatusClass::ClientError => warn!("{log_msg}"),
            _ => info!("{log_msg}"),
        }
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutdown requested, stopping gracefully...");
    }
}

/// Path prefix whose responses must never be cached by browsers or proxies.
pub const API_PREFIX: &str = "/api";

/// Path prefix of the token-protected routes.
const ADMIN_PREFIX: &str = "/api/admin";

/// A rocket fairing that marks every API response as uncacheable, so the
/// voting page always sees the current active poll.
#[derive(Debug, Copy, Clone)]
pub struct NoCacheFairing;

#[rocket::async_trait]
impl Fairing for NoCacheFairing {
    fn info(&self) -> Info {
        Info {
            name: "No-Cache",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        if !req.uri().path().as_str().starts_with(API_PREFIX) {
            return;
        }
        res.set_header(Header::new(
            "Cache-Control",
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        ));
        res.set_header(Header::new("Pragma", "no-cache"));
        res.set_header(Header::new("Expires", "0"));
        res.set_header(Header::new("Surrogate-Control", "no-store"));
    }
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use super::*;

    fn request_id(response: &rocket::local::asynchronous::LocalResponse<'_>) -> usize {
        response
            .headers()
            .get_one(REQUEST_ID_HEADER)
            .unwrap()
            .parse()
            .unwrap()
    }

    #[backend_test]
    async fn responses_carry_request_id(client: Client) {
        let first = client.get("/api/pairs").dispatch().await;
        assert_eq!(Status::Ok, first.status());
        let second = client.get("/api/polls/active").dispatch().await;
        assert_eq!(Status::NotFound, second.status());
        assert_ne!(request_id(&first), request_id(&second));

        // Unmatched routes are logged and tagged too.
        let missing = client.get("/nowhere").dispatch().await;
        assert_eq!(Status::NotFound, missing.status());
        request_id(&missing);
    }

    #[test]
    fn request_start_measures_time() {
        let start = RequestStart(Instant::now() - std::time::Duration::from_millis(25));
        assert!(start.elapsed_ms() >= 25);
    }
}
