use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client,
};
use rocket::{futures::TryStreamExt, response::status::Created, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::{Admin, AuthStatus},
        group::{GroupDetail, GroupView, NewGroupRequest},
        poll::{NewPollRequest, PollCounts, PollSummary, PollView},
        required_text, Deleted,
    },
    db::{Group, Pair, Poll, Vote, Voter},
    mongodb::{parse_id, Coll, Counter, IdParam},
};

use super::common::{delete_pairs_cascade, delete_voters_cascade, find_poll};

pub fn routes() -> Vec<Route> {
    routes![
        check_auth,
        get_polls,
        create_poll,
        delete_poll,
        activate_poll,
        close_poll,
        get_groups,
        create_group,
        delete_group,
    ]
}

#[get("/admin/auth")]
fn check_auth(_admin: Admin) -> Json<AuthStatus> {
    Json(AuthStatus {
        authenticated: true,
    })
}

#[get("/admin/polls")]
async fn get_polls(
    _admin: Admin,
    polls: Coll<Poll>,
    pairs: Coll<Pair>,
    voters: Coll<Voter>,
) -> Result<Json<Vec<PollSummary>>> {
    let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let all_polls: Vec<Poll> = polls.find(None, by_id).await?.try_collect().await?;

    let mut summaries = Vec::with_capacity(all_polls.len());
    for poll in all_polls {
        let owned = doc! { "poll_id": poll.id };
        let count = PollCounts {
            pairs: pairs.count_documents(owned.clone(), None).await?,
            voters: voters.count_documents(owned, None).await?,
        };
        summaries.push(PollSummary {
            poll: poll.into(),
            count,
        });
    }
    Ok(Json(summaries))
}

#[post("/admin/polls", data = "<request>", format = "json")]
async fn create_poll(
    _admin: Admin,
    request: Json<NewPollRequest>,
    polls: Coll<Poll>,
    counters: Coll<Counter>,
) -> Result<Created<Json<PollView>>> {
    let title = required_text(request.title.as_deref(), "Title is required")?;

    let id = Counter::next::<Poll>(&counters).await?;
    let poll = Poll::new(id, title);
    polls.insert_one(&poll, None).await?;
    info!("Created poll {id} \"{}\"", poll.title);

    Ok(Created::new(format!("/api/polls/{id}")).body(Json(poll.into())))
}

#[allow(clippy::too_many_arguments)]
#[delete("/admin/polls/<poll_id>")]
async fn delete_poll(
    _admin: Admin,
    poll_id: IdParam,
    polls: Coll<Poll>,
    groups: Coll<Group>,
    pairs: Coll<Pair>,
    voters: Coll<Voter>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<Json<Deleted>> {
    let poll_id = parse_id(poll_id, "poll")?;

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    polls
        .find_one_with_session(poll_id.as_doc(), None, &mut session)
        .await?
        .ok_or_else(|| Error::not_found(format!("Poll with ID {poll_id} not found")))?;

    // Votes go with the voters who cast them and with the pairs they were cast on.
    let owned = doc! { "poll_id": poll_id };
    let deleted_voters =
        delete_voters_cascade(&voters, &votes, owned.clone(), &mut session).await?;
    let deleted_pairs = delete_pairs_cascade(&pairs, &votes, owned.clone(), &mut session).await?;
    groups
        .delete_many_with_session(owned, None, &mut session)
        .await?;
    polls
        .delete_one_with_session(poll_id.as_doc(), None, &mut session)
        .await?;

    session.commit_transaction().await?;
    info!("Deleted poll {poll_id} with {deleted_pairs} pairs and {deleted_voters} voters");

    Ok(Json(Deleted::new()))
}

#[patch("/admin/polls/<poll_id>/activate")]
async fn activate_poll(
    _admin: Admin,
    poll_id: IdParam,
    polls: Coll<Poll>,
    db_client: &State<Client>,
) -> Result<Json<PollView>> {
    let poll_id = parse_id(poll_id, "poll")?;

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    polls
        .find_one_with_session(poll_id.as_doc(), None, &mut session)
        .await?
        .ok_or_else(|| Error::not_found("Poll not found"))?;

    // At most one poll is active, so deactivate everything first.
    polls
        .update_many_with_session(
            doc! { "is_active": true },
            doc! { "$set": { "is_active": false } },
            None,
            &mut session,
        )
        .await?;
    let after = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let poll = polls
        .find_one_and_update_with_session(
            poll_id.as_doc(),
            doc! { "$set": { "is_active": true } },
            after,
            &mut session,
        )
        .await?
        .ok_or_else(|| Error::not_found("Poll not found"))?;

    session.commit_transaction().await?;
    info!("Activated poll {poll_id}");

    Ok(Json(poll.into()))
}

#[patch("/admin/polls/<poll_id>/close")]
async fn close_poll(_admin: Admin, poll_id: IdParam, polls: Coll<Poll>) -> Result<Json<PollView>> {
    let poll_id = parse_id(poll_id, "poll")?;

    let after = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let poll = polls
        .find_one_and_update(
            poll_id.as_doc(),
            doc! { "$set": { "is_closed": true } },
            after,
        )
        .await?
        .ok_or_else(|| Error::not_found("Poll not found"))?;
    info!("Closed poll {poll_id}");

    Ok(Json(poll.into()))
}

#[get("/admin/polls/<poll_id>/groups")]
async fn get_groups(
    _admin: Admin,
    poll_id: IdParam,
    groups: Coll<Group>,
    pairs: Coll<Pair>,
) -> Result<Json<Vec<GroupDetail>>> {
    let poll_id = parse_id(poll_id, "poll")?;

    let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let poll_groups: Vec<Group> = groups
        .find(doc! { "poll_id": poll_id }, by_id.clone())
        .await?
        .try_collect()
        .await?;

    let mut details = Vec::with_capacity(poll_groups.len());
    for group in poll_groups {
        let group_pairs: Vec<Pair> = pairs
            .find(doc! { "group_id": group.id }, by_id.clone())
            .await?
            .try_collect()
            .await?;
        let group_pairs = group_pairs.into_iter().map(Into::into).collect();
        details.push(GroupDetail::new(group, group_pairs));
    }
    debug!("Found {} groups for poll {poll_id}", details.len());
    Ok(Json(details))
}

#[post("/admin/polls/<poll_id>/groups", data = "<request>", format = "json")]
async fn create_group(
    _admin: Admin,
    poll_id: IdParam,
    request: Json<NewGroupRequest>,
    polls: Coll<Poll>,
    groups: Coll<Group>,
    counters: Coll<Counter>,
) -> Result<Created<Json<GroupView>>> {
    let poll_id = parse_id(poll_id, "poll")?;
    find_poll(&polls, poll_id).await?;
    let title = required_text(request.title.as_deref(), "Group title is required")?;

    let id = Counter::next::<Group>(&counters).await?;
    let group = Group::new(id, title, poll_id);
    groups.insert_one(&group, None).await?;
    info!("Created group {id} in poll {poll_id}");

    Ok(Created::new(format!("/api/admin/polls/{poll_id}/groups")).body(Json(group.into())))
}

#[delete("/admin/groups/<group_id>")]
async fn delete_group(
    _admin: Admin,
    group_id: IdParam,
    groups: Coll<Group>,
    pairs: Coll<Pair>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<Json<Deleted>> {
    let group_id = parse_id(group_id, "group")?;

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    groups
        .find_one_with_session(group_id.as_doc(), None, &mut session)
        .await?
        .ok_or_else(|| Error::not_found("Group not found"))?;
    let deleted_pairs = delete_pairs_cascade(
        &pairs,
        &votes,
        doc! { "group_id": group_id },
        &mut session,
    )
    .await?;
    groups
        .delete_one_with_session(group_id.as_doc(), None, &mut session)
        .await?;

    session.commit_transaction().await?;
    info!("Deleted group {group_id} with {deleted_pairs} pairs");

    Ok(Json(Deleted::new()))
}
