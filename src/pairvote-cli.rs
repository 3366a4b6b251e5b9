//! A small maintenance tool for a running pairvote server.
//! It drives the admin maintenance endpoints and prints poll results, using the
//! server's own API types so it always agrees with the JSON the server returns.

use std::fmt::{Display, Formatter};

use clap::{Arg, ArgAction, ArgMatches, Command};
use reqwest::{
    blocking::{Client, RequestBuilder},
    header::AUTHORIZATION,
};
use serde::de::DeserializeOwned;

use pairvote::config::DEFAULT_ADMIN_TOKEN;
use pairvote::error::ErrorBody;
use pairvote::model::api::{
    maintenance::{Migration, Seeded},
    poll::{PairResult, PollResults},
};

const PROGRAM_NAME: &str = "pairvote-cli";

const ABOUT_TEXT: &str = "Maintain a pairvote server and inspect poll results.

EXIT CODES:
     0: Success.
     1: The server could not be reached or returned an error.";

const URL: &str = "URL";
const TOKEN: &str = "TOKEN";
const POLL_ID: &str = "POLL_ID";

const SEED: &str = "seed";
const MIGRATE_GROUPS: &str = "migrate-groups";
const RESULTS: &str = "results";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .subcommand_required(true)
        .arg(
            Arg::new(URL)
                .long("url")
                .help("Base URL of the server")
                .action(ArgAction::Set)
                .default_value("http://localhost:8000")
                .global(true),
        )
        .arg(
            Arg::new(TOKEN)
                .long("token")
                .help("Admin token, sent as `Authorization: Basic <TOKEN>`")
                .action(ArgAction::Set)
                .default_value(DEFAULT_ADMIN_TOKEN)
                .global(true),
        )
        .subcommand(
            Command::new(SEED)
                .about("Replace ALL data with the default \"Snack Preferences\" poll"),
        )
        .subcommand(
            Command::new(MIGRATE_GROUPS)
                .about("Give every poll a default group holding its ungrouped pairs"),
        )
        .subcommand(
            Command::new(RESULTS)
                .about("Print the per-pair results of a poll")
                .arg(
                    Arg::new(POLL_ID)
                        .help("The ID of the poll")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(u32))
                        .required(true),
                ),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// The request could not be sent or its response not read.
    Http(String),
    /// The server answered with an error status and message.
    Server { status: u16, message: String },
    /// The response body was not what the server should send.
    Format(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(msg) => write!(f, "Request failed: {msg}"),
            Self::Server { status, message } => write!(f, "Server error {status}: {message}"),
            Self::Format(msg) => write!(f, "Unexpected response: {msg}"),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Send a request and decode the JSON response.
fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Error> {
    let response = request.send()?;
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        let message = rocket::serde::json::serde_json::from_str::<ErrorBody>(&body)
            .map(|body| body.error)
            .unwrap_or(body);
        return Err(Error::Server {
            status: status.as_u16(),
            message,
        });
    }
    rocket::serde::json::serde_json::from_str(&body).map_err(|err| Error::Format(err.to_string()))
}

/// One line per pair, e.g. `cookies 2 (67%) vs chocolate 1 (33%)`.
struct PairLine<'a>(&'a PairResult);

impl Display for PairLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let PairResult { pair, tally, .. } = self.0;
        write!(
            f,
            "{} {} ({}%) vs {} {} ({}%)",
            pair.option_a,
            tally.votes_a,
            tally.percent_a,
            pair.option_b,
            tally.votes_b,
            tally.percent_b
        )
    }
}

fn print_results(results: &PollResults) {
    let state = if results.poll.is_closed {
        "closed"
    } else if results.poll.is_active {
        "active"
    } else {
        "inactive"
    };
    println!("Poll {}: {} ({state})", results.poll.id, results.poll.title);
    for pair in &results.pairs {
        println!("  {}", PairLine(pair));
    }
}

/// Run the given command, returning the process exit code.
fn run(args: &ArgMatches) -> u8 {
    // Unwraps safe as both arguments have defaults.
    let url = args.get_one::<String>(URL).unwrap().trim_end_matches('/');
    let token = args.get_one::<String>(TOKEN).unwrap();
    let client = Client::new();
    let authorization = format!("Basic {token}");

    let outcome = match args.subcommand() {
        Some((SEED, _)) => send::<Seeded>(
            client
                .post(format!("{url}/api/admin/seed"))
                .header(AUTHORIZATION, &authorization),
        )
        .map(|seeded| {
            println!(
                "Seeded poll {} \"{}\" with {} pairs",
                seeded.poll.id,
                seeded.poll.title,
                seeded.pairs.len()
            );
        }),
        Some((MIGRATE_GROUPS, _)) => send::<Migration>(
            client
                .post(format!("{url}/api/admin/migrate-groups"))
                .header(AUTHORIZATION, &authorization),
        )
        .map(|migration| {
            for poll in &migration.polls {
                println!(
                    "Poll {}: moved {} pairs into group {}",
                    poll.poll_id, poll.pairs, poll.group_id
                );
            }
            println!("Migrated {} polls", migration.polls.len());
        }),
        Some((RESULTS, sub_args)) => {
            // Unwrap safe as the argument is required.
            let poll_id = sub_args.get_one::<u32>(POLL_ID).unwrap();
            send::<PollResults>(client.get(format!("{url}/api/polls/{poll_id}")))
                .map(|results| print_results(&results))
        }
        _ => unreachable!("a subcommand is required"),
    };

    match outcome {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}
