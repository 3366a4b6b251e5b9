use std::collections::HashMap;

use mongodb::{bson::doc, options::FindOptions, Client};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::Admin,
        pair::PairView,
        voter::{VoteWithPair, VoterDetail},
        Deleted,
    },
    db::{Pair, Vote, Voter},
    mongodb::{parse_id, Coll, Id, IdParam},
};

use super::common::{any_of, delete_voters_cascade};

pub fn routes() -> Vec<Route> {
    routes![get_voters, delete_voter]
}

/// List every voter, newest first, with the votes they cast.
#[get("/admin/voters")]
async fn get_voters(
    _admin: Admin,
    voters: Coll<Voter>,
    votes: Coll<Vote>,
    pairs: Coll<Pair>,
) -> Result<Json<Vec<VoterDetail>>> {
    let newest_first = FindOptions::builder().sort(doc! { "_id": -1 }).build();
    let all_voters: Vec<Voter> = voters.find(None, newest_first).await?.try_collect().await?;

    let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let voter_ids = all_voters.iter().map(|voter| voter.id);
    let cast: Vec<Vote> = votes
        .find(any_of("voter_id", voter_ids), by_id)
        .await?
        .try_collect()
        .await?;
    let pair_ids = cast.iter().map(|vote| vote.pair_id);
    let pairs_by_id: HashMap<Id, Pair> = pairs
        .find(any_of("_id", pair_ids), None)
        .await?
        .map_ok(|pair| (pair.id, pair))
        .try_collect()
        .await?;

    let mut votes_by_voter: HashMap<Id, Vec<VoteWithPair>> = HashMap::new();
    for vote in cast {
        let pair = pairs_by_id.get(&vote.pair_id).cloned().map(PairView::from);
        votes_by_voter
            .entry(vote.voter_id)
            .or_default()
            .push(VoteWithPair {
                vote: vote.into(),
                pair,
            });
    }

    let details = all_voters
        .into_iter()
        .map(|voter| {
            let votes = votes_by_voter.remove(&voter.id).unwrap_or_default();
            VoterDetail::new(voter, votes)
        })
        .collect();
    Ok(Json(details))
}

#[delete("/admin/voters/<voter_id>")]
async fn delete_voter(
    _admin: Admin,
    voter_id: IdParam,
    voters: Coll<Voter>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<Json<Deleted>> {
    let voter_id = parse_id(voter_id, "voter")?;

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let deleted = delete_voters_cascade(&voters, &votes, voter_id.as_doc(), &mut session).await?;
    if deleted == 0 {
        return Err(Error::not_found("Voter not found"));
    }

    session.commit_transaction().await?;
    info!("Deleted voter {voter_id}");

    Ok(Json(Deleted::new()))
}
