use mongodb::{bson::doc, options::FindOptions, Client};
use rocket::{
    futures::TryStreamExt, http::Status, response::status::Created, serde::json::Json, Route,
    State,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::Admin,
        maintenance::{DbInfo, DbStatus, MigratedPoll, Migration, Seeded},
    },
    common::pair_text::OptionPair,
    db::{Group, Pair, Poll, Vote, Voter},
    mongodb::{Coll, Counter},
};

/// Title of the poll created by seeding.
pub const SEED_POLL_TITLE: &str = "Snack Preferences";

/// Options of the pairs created by seeding.
pub const SEED_PAIRS: [(&str, &str); 6] = [
    ("hot tamales", "dark chocolate"),
    ("skinny pop regular", "popcorn"),
    ("cookies", "chocolate"),
    ("munchies", "regular chex mix"),
    ("pringles", "pringles BBQ"),
    ("Chocolate raisins", "dried mangos"),
];

pub fn routes() -> Vec<Route> {
    routes![seed, migrate_groups, debug_db]
}

/// Replace all data with the default active poll.
#[allow(clippy::too_many_arguments)]
#[post("/admin/seed")]
async fn seed(
    _admin: Admin,
    polls: Coll<Poll>,
    groups: Coll<Group>,
    pairs: Coll<Pair>,
    voters: Coll<Voter>,
    votes: Coll<Vote>,
    counters: Coll<Counter>,
    db_client: &State<Client>,
) -> Result<Created<Json<Seeded>>> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    votes
        .delete_many_with_session(doc! {}, None, &mut session)
        .await?;
    pairs
        .delete_many_with_session(doc! {}, None, &mut session)
        .await?;
    voters
        .delete_many_with_session(doc! {}, None, &mut session)
        .await?;
    groups
        .delete_many_with_session(doc! {}, None, &mut session)
        .await?;
    polls
        .delete_many_with_session(doc! {}, None, &mut session)
        .await?;

    let poll_id = Counter::next::<Poll>(&counters).await?;
    let poll = Poll {
        is_active: true,
        ..Poll::new(poll_id, SEED_POLL_TITLE)
    };
    polls
        .insert_one_with_session(&poll, None, &mut session)
        .await?;

    let pair_ids =
        Counter::reserve::<Pair>(&counters, SEED_PAIRS.len() as u32).await?;
    let seeded_pairs = pair_ids
        .into_iter()
        .zip(SEED_PAIRS)
        .map(|(id, (a, b))| Pair::new(id, OptionPair::new(a, b), poll_id, None))
        .collect::<Vec<_>>();
    pairs
        .insert_many_with_session(&seeded_pairs, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    warn!("Seeded database with poll {poll_id}, all previous data removed");

    let seeded = Seeded {
        poll: poll.into(),
        pairs: seeded_pairs.into_iter().map(Into::into).collect(),
    };
    Ok(Created::new(format!("/api/polls/{poll_id}")).body(Json(seeded)))
}

/// Give every poll a default group holding its ungrouped pairs.
#[post("/admin/migrate-groups")]
async fn migrate_groups(
    _admin: Admin,
    polls: Coll<Poll>,
    groups: Coll<Group>,
    pairs: Coll<Pair>,
    counters: Coll<Counter>,
    db_client: &State<Client>,
) -> Result<Json<Migration>> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let all_polls: Vec<Poll> = polls
        .find_with_session(None, by_id, &mut session)
        .await?
        .stream(&mut session)
        .try_collect()
        .await?;

    let mut migrated = Vec::with_capacity(all_polls.len());
    for poll in all_polls {
        let group_id = Counter::next::<Group>(&counters).await?;
        groups
            .insert_one_with_session(Group::default_for(group_id, poll.id), None, &mut session)
            .await?;
        let result = pairs
            .update_many_with_session(
                doc! { "poll_id": poll.id, "group_id": null },
                doc! { "$set": { "group_id": group_id } },
                None,
                &mut session,
            )
            .await?;
        info!(
            "Moved {} pairs of poll {} into group {group_id}",
            result.modified_count, poll.id
        );
        migrated.push(MigratedPoll {
            poll_id: poll.id,
            group_id,
            pairs: result.modified_count,
        });
    }

    session.commit_transaction().await?;
    Ok(Json(Migration { polls: migrated }))
}

/// Check the database is reachable. Unavailable under the release profile.
#[get("/debug/db")]
async fn debug_db(config: &State<Config>, pairs: Coll<Pair>) -> Result<Json<DbStatus>> {
    if config.is_release() {
        return Err(Error::Status(
            Status::Forbidden,
            "Debug endpoints are not available in production".to_string(),
        ));
    }

    let pair_count = pairs.count_documents(None, None).await?;
    Ok(Json(DbStatus {
        status: "success".to_string(),
        message: "Database connection successful".to_string(),
        db_info: DbInfo { pair_count },
    }))
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::api::common::testing::*;
    use crate::model::{
        api::{
            maintenance::{DbStatus, Migration, Seeded},
            pair::NewPairRequest,
            vote::BallotRequest,
        },
        db::{Group, Pair, Poll, Voter, DEFAULT_GROUP_TITLE},
        mongodb::Coll,
    };

    use super::{SEED_PAIRS, SEED_POLL_TITLE};

    #[backend_test]
    async fn seed_replaces_everything(
        client: Client,
        polls: Coll<Poll>,
        pairs: Coll<Pair>,
        voters: Coll<Voter>,
    ) {
        let old = create_poll(&client, "Old").await;
        let pair = create_poll_pair(&client, old.id, "tea", "coffee").await;
        let ballot = BallotRequest::example(old.id, &[(pair.id, "tea")]);
        assert_eq!(Status::Ok, submit_ballot(&client, &ballot).await.status());

        // Seeding needs the admin credential.
        let response = client.post("/api/admin/seed").dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());

        let response = client
            .post("/api/admin/seed")
            .header(admin_header())
            .dispatch()
            .await;
        let seeded: Seeded = json_body(response, Status::Created).await;
        assert_eq!(seeded.poll.title, SEED_POLL_TITLE);
        assert!(seeded.poll.is_active);
        assert!(!seeded.poll.is_closed);
        let options = seeded
            .pairs
            .iter()
            .map(|pair| (pair.option_a.as_str(), pair.option_b.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(options, SEED_PAIRS.to_vec());

        assert_eq!(polls.count_documents(None, None).await.unwrap(), 1);
        assert_eq!(pairs.count_documents(None, None).await.unwrap(), 6);
        assert_eq!(voters.count_documents(None, None).await.unwrap(), 0);

        // The seeded poll is immediately open for voting.
        let response = client.get("/api/pairs").dispatch().await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test]
    async fn migrate_ungrouped_pairs(client: Client, groups: Coll<Group>, pairs: Coll<Pair>) {
        let snacks = create_poll(&client, "Snacks").await;
        let empty = create_poll(&client, "Empty").await;
        let sweet = create_group(&client, snacks.id, "Sweet").await;
        create_poll_pair(&client, snacks.id, "tea", "coffee").await;
        create_poll_pair(&client, snacks.id, "chips", "dip").await;
        let grouped = create_pair(
            &client,
            &NewPairRequest {
                option_a: Some("cookies".to_string()),
                option_b: Some("chocolate".to_string()),
                group_id: Some(sweet.id),
                poll_id: None,
            },
        )
        .await;

        let response = client
            .post("/api/admin/migrate-groups")
            .header(admin_header())
            .dispatch()
            .await;
        let migration: Migration = json_body(response, Status::Ok).await;
        assert_eq!(migration.polls.len(), 2);
        assert_eq!(migration.polls[0].poll_id, snacks.id);
        assert_eq!(migration.polls[0].pairs, 2);
        assert_eq!(migration.polls[1].poll_id, empty.id);
        assert_eq!(migration.polls[1].pairs, 0);

        let default_group = groups
            .find_one(migration.polls[0].group_id.as_doc(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(default_group.title, DEFAULT_GROUP_TITLE);
        assert_eq!(default_group.poll_id, snacks.id);
        assert_eq!(
            pairs
                .count_documents(doc! { "group_id": null }, None)
                .await
                .unwrap(),
            0
        );

        // Already grouped pairs stay where they were.
        let stored = pairs.find_one(grouped.id.as_doc(), None).await.unwrap().unwrap();
        assert_eq!(stored.group_id, Some(sweet.id));
    }

    #[backend_test]
    async fn debug_reports_pair_count(client: Client) {
        let poll = create_poll(&client, "Snacks").await;
        create_poll_pair(&client, poll.id, "tea", "coffee").await;

        let response = client.get("/api/debug/db").dispatch().await;
        let status: DbStatus = json_body(response, Status::Ok).await;
        assert_eq!(status.status, "success");
        assert_eq!(status.db_info.pair_count, 1);
    }
}
