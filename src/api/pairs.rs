use std::collections::HashMap;

use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
    Client,
};
use rocket::{futures::TryStreamExt, response::status::Created, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::Admin,
        group::GroupView,
        pair::{BulkPairsRequest, BulkPairsResponse, NewPairRequest, PairDetail, PairFilter, PairView},
        vote::VoteView,
        required_text, Deleted,
    },
    common::pair_text::{parse_pairs, OptionPair},
    db::{Group, Pair, Poll, Vote},
    mongodb::{parse_id, Coll, Counter, Id, IdParam},
};

use super::common::{any_of, delete_pairs_cascade, find_group, find_poll};

pub fn routes() -> Vec<Route> {
    routes![get_pairs, create_pair, delete_pair, bulk_create_pairs]
}

#[get("/admin/pairs?<filter..>")]
async fn get_pairs(
    _admin: Admin,
    filter: PairFilter,
    pairs: Coll<Pair>,
    groups: Coll<Group>,
    votes: Coll<Vote>,
) -> Result<Json<Vec<PairDetail>>> {
    let mut query = Document::new();
    if let Some(poll_id) = filter.poll_id {
        query.insert("poll_id", poll_id);
    }
    if let Some(group_id) = filter.group_id {
        query.insert("group_id", group_id);
    }

    let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let found: Vec<Pair> = pairs.find(query, by_id.clone()).await?.try_collect().await?;

    // Fetch the related records in one query each rather than one per pair.
    let pair_ids = found.iter().map(|pair| pair.id);
    let mut votes_by_pair: HashMap<Id, Vec<VoteView>> = HashMap::new();
    let mut cursor = votes.find(any_of("pair_id", pair_ids), by_id).await?;
    while let Some(vote) = cursor.try_next().await? {
        votes_by_pair.entry(vote.pair_id).or_default().push(vote.into());
    }
    let group_ids = found.iter().filter_map(|pair| pair.group_id);
    let groups_by_id: HashMap<Id, Group> = groups
        .find(any_of("_id", group_ids), None)
        .await?
        .map_ok(|group| (group.id, group))
        .try_collect()
        .await?;

    let details = found
        .into_iter()
        .map(|pair| PairDetail {
            votes: votes_by_pair.remove(&pair.id).unwrap_or_default(),
            group: pair
                .group_id
                .and_then(|id| groups_by_id.get(&id))
                .cloned()
                .map(GroupView::from),
            pair: pair.into(),
        })
        .collect::<Vec<_>>();
    debug!("Found {} pairs matching {filter:?}", details.len());
    Ok(Json(details))
}

#[post("/admin/pairs", data = "<request>", format = "json")]
async fn create_pair(
    _admin: Admin,
    request: Json<NewPairRequest>,
    polls: Coll<Poll>,
    groups: Coll<Group>,
    pairs: Coll<Pair>,
    counters: Coll<Counter>,
) -> Result<Created<Json<PairView>>> {
    let message = "Both options are required";
    let options = OptionPair::new(
        required_text(request.option_a.as_deref(), message)?,
        required_text(request.option_b.as_deref(), message)?,
    );

    // A group determines its own poll.
    let (poll_id, group_id) = match (request.group_id, request.poll_id) {
        (Some(group_id), _) => (find_group(&groups, group_id).await?.poll_id, Some(group_id)),
        (None, Some(poll_id)) => (find_poll(&polls, poll_id).await?.id, None),
        (None, None) => return Err(Error::bad_request("Either groupId or pollId is required")),
    };

    let id = Counter::next::<Pair>(&counters).await?;
    let pair = Pair::new(id, options, poll_id, group_id);
    pairs.insert_one(&pair, None).await?;
    info!("Created pair {id} in poll {poll_id}");

    Ok(Created::new(format!("/api/admin/pairs/{id}")).body(Json(pair.into())))
}

#[delete("/admin/pairs/<pair_id>")]
async fn delete_pair(
    _admin: Admin,
    pair_id: IdParam,
    pairs: Coll<Pair>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<Json<Deleted>> {
    let pair_id = parse_id(pair_id, "pair")?;

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let deleted = delete_pairs_cascade(&pairs, &votes, pair_id.as_doc(), &mut session).await?;
    if deleted == 0 {
        return Err(Error::not_found("Pair not found"));
    }

    session.commit_transaction().await?;
    info!("Deleted pair {pair_id}");

    Ok(Json(Deleted::new()))
}

#[post("/admin/pairs/bulk", data = "<request>", format = "json")]
async fn bulk_create_pairs(
    _admin: Admin,
    request: Json<BulkPairsRequest>,
    polls: Coll<Poll>,
    groups: Coll<Group>,
    pairs: Coll<Pair>,
    counters: Coll<Counter>,
    db_client: &State<Client>,
) -> Result<Json<BulkPairsResponse>> {
    let text = request
        .pairs_text
        .as_deref()
        .filter(|text| !text.is_empty())
        .ok_or_else(|| Error::bad_request("No text provided"))?;
    let options = parse_pairs(text, request.format);

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    // Pairs always land in a group: the given one, else the poll's first.
    let (poll_id, group_id) = match (request.group_id, request.poll_id) {
        (Some(group_id), _) => {
            let group = groups
                .find_one_with_session(group_id.as_doc(), None, &mut session)
                .await?
                .ok_or_else(|| Error::not_found("Group not found"))?;
            (group.poll_id, group_id)
        }
        (None, Some(poll_id)) => {
            polls
                .find_one_with_session(poll_id.as_doc(), None, &mut session)
                .await?
                .ok_or_else(|| Error::not_found("Poll not found"))?;
            let first = FindOptions::builder().sort(doc! { "_id": 1 }).limit(1).build();
            let existing = groups
                .find_with_session(doc! { "poll_id": poll_id }, first, &mut session)
                .await?
                .next(&mut session)
                .await
                .transpose()?;
            let group_id = match existing {
                Some(group) => group.id,
                None => {
                    let id = Counter::next::<Group>(&counters).await?;
                    groups
                        .insert_one_with_session(Group::default_for(id, poll_id), None, &mut session)
                        .await?;
                    info!("Created default group {id} for poll {poll_id}");
                    id
                }
            };
            (poll_id, group_id)
        }
        (None, None) => return Err(Error::bad_request("Either Group ID or Poll ID is required")),
    };

    let ids = Counter::reserve::<Pair>(&counters, options.len() as u32).await?;
    let new_pairs = ids
        .into_iter()
        .zip(options)
        .map(|(id, options)| Pair::new(id, options, poll_id, Some(group_id)))
        .collect::<Vec<_>>();
    if !new_pairs.is_empty() {
        pairs
            .insert_many_with_session(&new_pairs, None, &mut session)
            .await?;
    }

    session.commit_transaction().await?;
    info!(
        "Imported {} pairs into group {group_id} of poll {poll_id}",
        new_pairs.len()
    );

    Ok(Json(BulkPairsResponse {
        pairs: new_pairs.into_iter().map(Into::into).collect(),
    }))
}
