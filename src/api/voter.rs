use rocket::{serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};

use crate::{
    election::Election,
    error::{Error, Result},
    logging::RequestId,
    model::{
        auth::AuthToken,
        candidate::CandidateId,
        voter::{Voter, VoterDescription},
    },
};

pub fn routes() -> Vec<Route> {
    routes![get_voter, cast_vote]
}

/// A ballot naming exactly one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub candidate: CandidateId,
}

#[get("/voter")]
async fn get_voter(token: AuthToken<Voter>, election: &State<Election>) -> Result<Json<VoterDescription>> {
    let voter = election
        .voter(token.id)?
        .ok_or(Error::VoterNotFound(token.id))?;
    Ok(Json(voter.into()))
}

#[post("/voter/vote", data = "<ballot>", format = "json")]
async fn cast_vote(
    token: AuthToken<Voter>,
    ballot: Json<VoteRequest>,
    election: &State<Election>,
    request_id: RequestId,
) -> Result<()> {
    election.cast_vote(token.id, ballot.candidate)?;
    info!("req{request_id}: ballot accepted");
    Ok(())
}
