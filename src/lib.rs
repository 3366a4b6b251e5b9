#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::{LoggerFairing, NoCacheFairing, API_PREFIX};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// Build the server: routes under `/api`, config, database and logging.
pub fn build() -> Rocket<Build> {
    base_rocket(rocket::build()).attach(DatabaseFairing)
}

/// Everything except the database connection, which tests supply themselves.
fn base_rocket(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount(API_PREFIX, api::routes())
        .register("/", error::catchers())
        .attach(ConfigFairing)
        .attach(NoCacheFairing)
        .attach(LoggerFairing)
}

/// A client for the test database server.
#[cfg(test)]
async fn db_client() -> mongodb::Client {
    let figment = rocket::Config::figment();
    let db_uri = figment
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .expect("Could not connect to the test database server")
}

/// A fresh database name, so tests can run in parallel.
#[cfg(test)]
fn database() -> String {
    use rand::{distributions::Alphanumeric, Rng};

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("{}_test_{suffix}", config::DATABASE)
}

/// A server using the given database instead of the configured one.
#[cfg(test)]
async fn rocket_for_db(db_client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = db_client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db)
        .await
        .expect("Failed to create test indexes");
    base_rocket(rocket::build())
        .manage(db_client)
        .manage(db)
}
