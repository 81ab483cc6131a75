use rocket::{serde::json::Json, Route, State};

use crate::{
    election::{Election, ElectionResults},
    error::{Error, Result},
    model::{
        admin::Admin,
        auth::AuthToken,
        candidate::{Candidate, CandidateSummary},
        settings::{ElectionSettings, HistoryEntry},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        candidates_admin,
        candidates_non_admin,
        election_settings,
        election_history,
        results_admin,
        results_non_admin,
    ]
}

#[get("/candidates", rank = 1)]
async fn candidates_admin(
    _token: AuthToken<Admin>,
    election: &State<Election>,
) -> Result<Json<Vec<Candidate>>> {
    Ok(Json(election.candidates()?))
}

/// Candidates without their running tallies.
#[get("/candidates", rank = 2)]
async fn candidates_non_admin(election: &State<Election>) -> Result<Json<Vec<CandidateSummary>>> {
    let candidates = election.candidates()?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

#[get("/election")]
async fn election_settings(election: &State<Election>) -> Result<Json<ElectionSettings>> {
    Ok(Json(election.settings()?))
}

#[get("/election/history")]
async fn election_history(election: &State<Election>) -> Result<Json<Vec<HistoryEntry>>> {
    Ok(Json(election.history()?))
}

/// Admins may watch the count at any time.
#[get("/results", rank = 1)]
async fn results_admin(
    _token: AuthToken<Admin>,
    election: &State<Election>,
) -> Result<Json<ElectionResults>> {
    Ok(Json(election.results()?))
}

#[get("/results", rank = 2)]
async fn results_non_admin(election: &State<Election>) -> Result<Json<ElectionResults>> {
    if !election.settings()?.results_visible {
        return Err(Error::not_found("Published results"));
    }
    Ok(Json(election.results()?))
}
