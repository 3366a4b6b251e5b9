use std::collections::HashMap;

use mongodb::{bson::doc, options::FindOptions, Client};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        group::GroupDetail,
        pair::PairView,
        poll::{ActivePoll, PairResult, PollResults},
        required_text,
        vote::{BallotRequest, VoteView},
        Message,
    },
    common::tally::Tally,
    db::{Group, Pair, Poll, Vote, Voter},
    mongodb::{parse_id, Coll, Counter, Id, IdParam},
};

use super::common::{any_of, find_poll};

pub fn routes() -> Vec<Route> {
    routes![get_pairs, get_active_poll, get_poll_results, submit_votes]
}

fn by_id() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

async fn find_active_poll(polls: &Coll<Poll>) -> Result<Option<Poll>> {
    Ok(polls.find_one(doc! { "is_active": true }, None).await?)
}

async fn poll_pairs(pairs: &Coll<Pair>, poll_id: Id) -> Result<Vec<Pair>> {
    Ok(pairs
        .find(doc! { "poll_id": poll_id }, by_id())
        .await?
        .try_collect()
        .await?)
}

/// Pairs of the active poll, or nothing if no poll is active.
#[get("/pairs")]
async fn get_pairs(polls: Coll<Poll>, pairs: Coll<Pair>) -> Result<Json<Vec<PairView>>> {
    let pairs = match find_active_poll(&polls).await? {
        Some(poll) => poll_pairs(&pairs, poll.id).await?,
        None => Vec::new(),
    };
    Ok(Json(pairs.into_iter().map(Into::into).collect()))
}

#[get("/polls/active")]
async fn get_active_poll(
    polls: Coll<Poll>,
    groups: Coll<Group>,
    pairs: Coll<Pair>,
) -> Result<Json<ActivePoll>> {
    let poll = find_active_poll(&polls)
        .await?
        .ok_or_else(|| Error::not_found("No active poll found"))?;

    let all_pairs = poll_pairs(&pairs, poll.id)
        .await?
        .into_iter()
        .map(PairView::from)
        .collect::<Vec<_>>();
    let poll_groups: Vec<Group> = groups
        .find(doc! { "poll_id": poll.id }, by_id())
        .await?
        .try_collect()
        .await?;
    let groups = poll_groups
        .into_iter()
        .map(|group| {
            let group_pairs = all_pairs
                .iter()
                .filter(|pair| pair.group_id == Some(group.id))
                .cloned()
                .collect();
            GroupDetail::new(group, group_pairs)
        })
        .collect::<Vec<_>>();
    debug!(
        "Active poll {} has {} groups and {} pairs",
        poll.id,
        groups.len(),
        all_pairs.len()
    );

    Ok(Json(ActivePoll {
        poll: poll.into(),
        pairs: all_pairs,
        groups,
    }))
}

/// A poll with every pair's votes and tally.
#[get("/polls/<poll_id>")]
async fn get_poll_results(
    poll_id: IdParam,
    polls: Coll<Poll>,
    pairs: Coll<Pair>,
    votes: Coll<Vote>,
) -> Result<Json<PollResults>> {
    let poll_id = parse_id(poll_id, "poll")?;
    let poll = find_poll(&polls, poll_id).await?;

    let poll_pairs = poll_pairs(&pairs, poll_id).await?;
    let pair_ids = poll_pairs.iter().map(|pair| pair.id);
    let mut votes_by_pair: HashMap<Id, Vec<Vote>> = HashMap::new();
    let mut cursor = votes.find(any_of("pair_id", pair_ids), by_id()).await?;
    while let Some(vote) = cursor.try_next().await? {
        votes_by_pair.entry(vote.pair_id).or_default().push(vote);
    }

    let results = poll_pairs
        .into_iter()
        .map(|pair| {
            let pair_votes = votes_by_pair.remove(&pair.id).unwrap_or_default();
            let tally = Tally::count(&pair, &pair_votes);
            PairResult {
                pair: pair.into(),
                votes: pair_votes.into_iter().map(VoteView::from).collect(),
                tally,
            }
        })
        .collect();

    Ok(Json(PollResults {
        poll: poll.into(),
        pairs: results,
    }))
}

/// Record one voter's ballot: a new voter plus one vote per selection.
#[post("/vote", data = "<ballot>", format = "json")]
async fn submit_votes(
    ballot: Json<BallotRequest>,
    polls: Coll<Poll>,
    voters: Coll<Voter>,
    votes: Coll<Vote>,
    counters: Coll<Counter>,
    db_client: &State<Client>,
) -> Result<Json<Message>> {
    let ballot = ballot.into_inner();
    let name = required_text(ballot.voter_name.as_deref(), "Voter name is required")?;
    let poll_id = ballot
        .poll_id
        .ok_or_else(|| Error::bad_request("Poll ID is required"))?;
    let poll = find_poll(&polls, poll_id).await?;
    if !poll.is_open() {
        return Err(Error::bad_request(
            "This poll is closed and no longer accepting votes",
        ));
    }

    // Allocate IDs up front; the counters stay out of the transaction.
    let voter_id = Counter::next::<Voter>(&counters).await?;
    let vote_ids = Counter::reserve::<Vote>(&counters, ballot.votes.len() as u32).await?;

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let voter = Voter::new(voter_id, name, poll_id);
    voters
        .insert_one_with_session(&voter, None, &mut session)
        .await?;

    let new_votes = vote_ids
        .into_iter()
        .zip(ballot.votes)
        .map(|(id, entry)| Vote::new(id, entry.selection, entry.pair_id, voter_id))
        .collect::<Vec<_>>();
    if !new_votes.is_empty() {
        votes
            .insert_many_with_session(&new_votes, None, &mut session)
            .await?;
    }

    session.commit_transaction().await?;
    info!(
        "Recorded {} votes from voter {voter_id} in poll {poll_id}",
        new_votes.len()
    );

    Ok(Json(Message::new("Votes recorded successfully")))
}

#[cfg(test)]
mod tests {
    use rocket::{
        futures::future::join_all,
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::api::common::testing::*;
    use crate::model::{
        api::{
            pair::{NewPairRequest, PairView},
            poll::{ActivePoll, PollResults},
            vote::BallotRequest,
            Message,
        },
        db::{Vote, Voter},
        mongodb::{Coll, Id},
    };

    #[backend_test]
    async fn public_pairs_follow_active_poll(client: Client) {
        // No active poll.
        let response = client.get("/api/pairs").dispatch().await;
        let pairs: Vec<PairView> = json_body(response, Status::Ok).await;
        assert!(pairs.is_empty());
        let response = client.get("/api/polls/active").dispatch().await;
        assert_eq!(
            "No active poll found",
            error_message(response, Status::NotFound).await
        );

        let snacks = create_poll(&client, "Snacks").await;
        let drinks = create_poll(&client, "Drinks").await;
        let cookies = create_poll_pair(&client, snacks.id, "cookies", "chocolate").await;
        let tea = create_poll_pair(&client, drinks.id, "tea", "coffee").await;

        activate_poll(&client, snacks.id).await;
        let response = client.get("/api/pairs").dispatch().await;
        let pairs: Vec<PairView> = json_body(response, Status::Ok).await;
        assert_eq!(pairs, vec![cookies]);

        activate_poll(&client, drinks.id).await;
        let response = client.get("/api/pairs").dispatch().await;
        assert_eq!(response.headers().get_one("Cache-Control").unwrap(),
            "no-store, no-cache, must-revalidate, proxy-revalidate");
        let pairs: Vec<PairView> = json_body(response, Status::Ok).await;
        assert_eq!(pairs, vec![tea]);
    }

    #[backend_test]
    async fn active_poll_with_groups(client: Client) {
        let poll = create_poll(&client, "Snacks").await;
        let sweet = create_group(&client, poll.id, "Sweet").await;
        let salty = create_group(&client, poll.id, "Salty").await;
        let grouped = |group_id: Id, a: &str, b: &str| NewPairRequest {
            option_a: Some(a.to_string()),
            option_b: Some(b.to_string()),
            group_id: Some(group_id),
            poll_id: None,
        };
        let cookies = create_pair(&client, &grouped(sweet.id, "cookies", "chocolate")).await;
        let chips = create_pair(&client, &grouped(salty.id, "chips", "dip")).await;
        let loose = create_poll_pair(&client, poll.id, "tea", "coffee").await;
        activate_poll(&client, poll.id).await;

        let response = client.get("/api/polls/active").dispatch().await;
        let active: ActivePoll = json_body(response, Status::Ok).await;
        assert_eq!(active.poll.id, poll.id);
        assert!(active.poll.is_active);
        assert_eq!(active.pairs, vec![cookies.clone(), chips.clone(), loose]);
        assert_eq!(active.groups.len(), 2);
        assert_eq!(active.groups[0].group, sweet);
        assert_eq!(active.groups[0].pairs, vec![cookies]);
        assert_eq!(active.groups[1].pairs, vec![chips]);
    }

    #[backend_test]
    async fn vote_and_tally(client: Client, voters: Coll<Voter>, votes: Coll<Vote>) {
        let poll = create_poll(&client, "Snacks").await;
        let cookies = create_poll_pair(&client, poll.id, "cookies", "chocolate").await;
        let chips = create_poll_pair(&client, poll.id, "chips", "dip").await;

        for selections in [
            [(cookies.id, "cookies"), (chips.id, "dip")],
            [(cookies.id, "cookies"), (chips.id, "chips")],
            [(cookies.id, "chocolate"), (chips.id, "salsa")],
        ] {
            let response = submit_ballot(&client, &BallotRequest::example(poll.id, &selections)).await;
            let message: Message = json_body(response, Status::Ok).await;
            assert_eq!(message.message, "Votes recorded successfully");
        }
        assert_eq!(voters.count_documents(None, None).await.unwrap(), 3);
        assert_eq!(votes.count_documents(None, None).await.unwrap(), 6);

        let response = client.get(format!("/api/polls/{}", poll.id)).dispatch().await;
        let results: PollResults = json_body(response, Status::Ok).await;
        assert_eq!(results.poll.id, poll.id);
        assert_eq!(results.pairs.len(), 2);

        let cookie_result = &results.pairs[0];
        assert_eq!(cookie_result.pair, cookies);
        assert_eq!(cookie_result.votes.len(), 3);
        assert_eq!(cookie_result.tally.votes_a, 2);
        assert_eq!(cookie_result.tally.votes_b, 1);
        assert_eq!(cookie_result.tally.percent_a, 67);
        assert_eq!(cookie_result.tally.percent_b, 33);

        // The "salsa" vote matches neither option.
        let chip_result = &results.pairs[1];
        assert_eq!(chip_result.votes.len(), 3);
        assert_eq!(chip_result.tally.total, 2);
        assert_eq!((chip_result.tally.percent_a, chip_result.tally.percent_b), (50, 50));
    }

    #[backend_test]
    async fn concurrent_ballots(client: Client, voters: Coll<Voter>, votes: Coll<Vote>) {
        let poll = create_poll(&client, "Snacks").await;
        let cookies = create_poll_pair(&client, poll.id, "cookies", "chocolate").await;
        let chips = create_poll_pair(&client, poll.id, "chips", "dip").await;
        let ballot = BallotRequest::example(poll.id, &[(cookies.id, "cookies"), (chips.id, "dip")]);

        // Every ballot races for the same voter and vote counters.
        let responses = join_all((0..8).map(|_| submit_ballot(&client, &ballot))).await;
        for response in responses {
            let message: Message = json_body(response, Status::Ok).await;
            assert_eq!(message.message, "Votes recorded successfully");
        }
        assert_eq!(voters.count_documents(None, None).await.unwrap(), 8);
        assert_eq!(votes.count_documents(None, None).await.unwrap(), 16);

        let response = client.get(format!("/api/polls/{}", poll.id)).dispatch().await;
        let results: PollResults = json_body(response, Status::Ok).await;
        assert_eq!(results.pairs[0].tally.votes_a, 8);
        assert_eq!(results.pairs[1].tally.votes_b, 8);
    }

    #[backend_test]
    async fn results_errors(client: Client) {
        let response = client.get("/api/polls/12").dispatch().await;
        assert_eq!("Poll not found", error_message(response, Status::NotFound).await);
        let response = client.get("/api/polls/twelve").dispatch().await;
        assert_eq!("Invalid poll ID", error_message(response, Status::BadRequest).await);
    }

    #[backend_test]
    async fn bad_ballots(client: Client, voters: Coll<Voter>) {
        let poll = create_poll(&client, "Snacks").await;
        let pair = create_poll_pair(&client, poll.id, "cookies", "chocolate").await;
        let valid = BallotRequest::example(poll.id, &[(pair.id, "cookies")]);

        let cases = [
            (
                BallotRequest {
                    voter_name: Some("  ".to_string()),
                    ..valid.clone()
                },
                Status::BadRequest,
                "Voter name is required",
            ),
            (
                BallotRequest {
                    poll_id: None,
                    ..valid.clone()
                },
                Status::BadRequest,
                "Poll ID is required",
            ),
            (
                BallotRequest {
                    poll_id: Some(Id::from(99)),
                    ..valid.clone()
                },
                Status::NotFound,
                "Poll not found",
            ),
        ];
        for (ballot, status, message) in cases {
            let response = submit_ballot(&client, &ballot).await;
            assert_eq!(message, error_message(response, status).await);
        }

        // Malformed JSON never reaches the handler but still gets a JSON error.
        let response = client
            .post("/api/vote")
            .header(ContentType::JSON)
            .body("{not json")
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let body: serde_json::Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(body["error"].is_string());

        assert_eq!(voters.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test]
    async fn empty_ballot_still_records_voter(client: Client, voters: Coll<Voter>) {
        let poll = create_poll(&client, "Snacks").await;
        let ballot = BallotRequest::example(poll.id, &[]);
        assert_eq!(Status::Ok, submit_ballot(&client, &ballot).await.status());
        let voter = voters.find_one(None, None).await.unwrap().unwrap();
        assert_eq!(voter.name, "Ada");
        assert_eq!(voter.poll_id, poll.id);
    }
}
