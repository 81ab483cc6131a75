use rocket::{
    http::Status,
    serde::json::{self, Json},
    Route, State,
};
use serde::{Deserialize, Serialize};

use crate::{
    election::Election,
    error::{Error, Result},
    model::{
        admin::Admin,
        auth::AuthToken,
        candidate::{Candidate, CandidateId, CandidateSpec, CandidateUpdate},
        settings::ElectionSettings,
        voter::Voter,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        create_candidate,
        update_candidate,
        delete_candidate,
        get_voters,
        provision_voters,
        rename_election,
        start_election,
        end_election,
        reset_election,
    ]
}

/// How many voter credentials to issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Optionally names the election as it starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn create_candidate(
    _token: AuthToken<Admin>,
    spec: Json<CandidateSpec>,
    election: &State<Election>,
) -> Result<Json<Candidate>> {
    Ok(Json(election.create_candidate(spec.0)?))
}

#[put("/candidates/<candidate_id>", data = "<update>", format = "json")]
async fn update_candidate(
    _token: AuthToken<Admin>,
    candidate_id: CandidateId,
    update: Json<CandidateUpdate>,
    election: &State<Election>,
) -> Result<Json<Candidate>> {
    Ok(Json(election.update_candidate(candidate_id, update.0)?))
}

#[delete("/candidates/<candidate_id>")]
async fn delete_candidate(
    _token: AuthToken<Admin>,
    candidate_id: CandidateId,
    election: &State<Election>,
) -> Result<Status> {
    election.delete_candidate(candidate_id)?;
    Ok(Status::Ok)
}

/// The full roster, credentials included, so they can be handed out.
#[get("/voters")]
async fn get_voters(_token: AuthToken<Admin>, election: &State<Election>) -> Result<Json<Vec<Voter>>> {
    Ok(Json(election.voters()?))
}

/// Returns only the newly issued voters.
#[post("/voters", data = "<request>", format = "json")]
async fn provision_voters(
    _token: AuthToken<Admin>,
    request: Json<ProvisionRequest>,
    election: &State<Election>,
) -> Result<Json<Vec<Voter>>> {
    Ok(Json(election.provision_voters(request.count)?))
}

#[put("/election/name", data = "<request>", format = "json")]
async fn rename_election(
    _token: AuthToken<Admin>,
    request: Json<RenameRequest>,
    election: &State<Election>,
) -> Result<Json<ElectionSettings>> {
    Ok(Json(election.rename(request.0.name)?))
}

/// The body is optional, but a body that is present must parse.
#[post("/election/start", data = "<request>")]
async fn start_election(
    token: AuthToken<Admin>,
    request: std::result::Result<Json<StartRequest>, json::Error<'_>>,
    election: &State<Election>,
) -> Result<Json<ElectionSettings>> {
    let name = match request {
        Ok(request) => request.0.name,
        Err(json::Error::Parse(body, _)) if body.trim().is_empty() => None,
        Err(e) => return Err(Error::MalformedBody(e.to_string())),
    };
    let settings = election.start(name)?;
    info!("Election started by admin {}", token.id);
    Ok(Json(settings))
}

#[post("/election/end")]
async fn end_election(
    token: AuthToken<Admin>,
    election: &State<Election>,
) -> Result<Json<ElectionSettings>> {
    let settings = election.end()?;
    info!("Election ended by admin {}", token.id);
    Ok(Json(settings))
}

#[post("/election/reset")]
async fn reset_election(
    token: AuthToken<Admin>,
    election: &State<Election>,
) -> Result<Json<ElectionSettings>> {
    let settings = election.reset()?;
    info!("Election reset by admin {}", token.id);
    Ok(Json(settings))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::ContentType,
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json,
    };

    use crate::model::{
        candidate::MAX_CANDIDATES,
        settings::ElectionPhase,
        voter::MAX_VOTERS,
        Id,
    };

    use super::*;

    #[backend_test(admin)]
    async fn create_update_delete_candidate(client: Client, election: Election) {
        // Create
        let created = create_candidate_from(&client, &CandidateSpec::example1()).await;
        assert_eq!(created.name, "Ada Lovelace");
        assert_eq!(created.votes, 0);
        assert_eq!(election.candidates().unwrap(), vec![created.clone()]);

        // Update
        let update = CandidateUpdate {
            name: None,
            party: Some("Engine Party".to_string()),
        };
        let response = client
            .put(uri!(update_candidate(created.id)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&update).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let updated: Candidate =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.party, "Engine Party");

        // Delete
        let response = client.delete(uri!(delete_candidate(created.id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(election.candidates().unwrap().is_empty());

        // Delete again
        let response = client.delete(uri!(delete_candidate(created.id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn bad_create_candidate(client: Client, election: Election) {
        // Blank name.
        let blank = CandidateSpec::new("  ", "Party");
        create_candidate_expect_status(&client, &blank, Status::BadRequest).await;

        // Malformed body.
        let response = client
            .post(uri!(create_candidate))
            .header(ContentType::JSON)
            .body(r#"{"party": "No name"}"#)
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());

        // Too many.
        for i in 0..MAX_CANDIDATES {
            create_candidate_from(&client, &CandidateSpec::new(format!("Candidate {i}"), ""))
                .await;
        }
        let sixth = CandidateSpec::example1();
        create_candidate_expect_status(&client, &sixth, Status::UnprocessableEntity).await;
        assert_eq!(election.candidates().unwrap().len(), MAX_CANDIDATES);
    }

    #[backend_test(admin)]
    async fn provision_and_list_voters(client: Client) {
        let batch = provision(&client, 60, Status::Ok).await;
        assert_eq!(batch.len(), 60);

        let batch = provision(&client, 20, Status::Ok).await;
        assert_eq!(batch.len(), 9);
        assert_eq!(batch[8].handle, "USN069");

        provision(&client, 1, Status::UnprocessableEntity).await;

        let response = client.get(uri!(get_voters)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let voters: Vec<Voter> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(voters.len(), MAX_VOTERS);
        assert!(voters.iter().all(|v| v.secret == "123" && !v.has_voted));
    }

    #[backend_test(admin)]
    async fn lifecycle_over_http(client: Client, election: Election) {
        // Not ready yet.
        let response = start(&client, Some("Spring poll")).await;
        assert_eq!(Status::Conflict, response.status());

        create_candidate_from(&client, &CandidateSpec::example1()).await;
        create_candidate_from(&client, &CandidateSpec::example2()).await;
        provision(&client, 3, Status::Ok).await;

        // Rename, then start under that name.
        let response = client
            .put(uri!(rename_election))
            .header(ContentType::JSON)
            .body(r#"{"name": "Spring poll"}"#)
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let response = start(&client, None).await;
        assert_eq!(Status::Ok, response.status());
        let settings: ElectionSettings =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(settings.phase, ElectionPhase::Ongoing);
        assert_eq!(settings.name, "Spring poll");

        // Rosters are frozen.
        create_candidate_expect_status(&client, &CandidateSpec::example3(), Status::Conflict).await;
        provision(&client, 1, Status::Conflict).await;
        assert_eq!(Status::Conflict, start(&client, None).await.status());

        election.cast_vote(Id::new(1), Id::new(2)).unwrap();

        let response = client.post(uri!(end_election)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let settings: ElectionSettings =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(settings.phase, ElectionPhase::Ended);
        assert!(settings.results_visible);
        assert_eq!(settings.history[0].winners, ["Charles Babbage"]);

        let response = client.post(uri!(end_election)).dispatch().await;
        assert_eq!(Status::Conflict, response.status());

        let response = client.post(uri!(reset_election)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let settings = election.settings().unwrap();
        assert_eq!(settings.phase, ElectionPhase::NotStarted);
        assert_eq!(settings.history.len(), 1);
        assert_eq!(election.voters().unwrap().len(), 3);
    }

    #[backend_test(admin)]
    async fn start_body_is_optional_but_must_parse(client: Client, election: Election) {
        election.create_candidate(CandidateSpec::example1()).unwrap();
        election.provision_voters(1).unwrap();
        election.rename("Autumn poll".to_string()).unwrap();

        let response = client
            .post(uri!(start_election))
            .header(ContentType::JSON)
            .body(r#"{"name": 5}"#)
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());
        assert_eq!(election.settings().unwrap().phase, ElectionPhase::NotStarted);

        let response = client.post(uri!(start_election)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let settings = election.settings().unwrap();
        assert_eq!(settings.phase, ElectionPhase::Ongoing);
        assert_eq!(settings.name, "Autumn poll");
    }

    #[backend_test]
    async fn non_admin_is_refused(client: Client, election: Election) {
        let response = client
            .post(uri!(create_candidate))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&CandidateSpec::example1()).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        let response = client.get(uri!(get_voters)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client.post(uri!(reset_election)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        assert!(election.candidates().unwrap().is_empty());
    }

    #[backend_test(voter)]
    async fn voter_is_not_admin(client: Client, election: Election) {
        let response = client
            .post(uri!(provision_voters))
            .header(ContentType::JSON)
            .body(r#"{"count": 5}"#)
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
        assert_eq!(election.voters().unwrap().len(), 1);
    }

    async fn create_candidate_from(client: &Client, spec: &CandidateSpec) -> Candidate {
        let response = create_candidate_expect_status(client, spec, Status::Ok).await;
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    async fn create_candidate_expect_status<'c>(
        client: &'c Client,
        spec: &CandidateSpec,
        status: Status,
    ) -> LocalResponse<'c> {
        let response = client
            .post(uri!(create_candidate))
            .header(ContentType::JSON)
            .body(serde_json::to_string(spec).unwrap())
            .dispatch()
            .await;
        assert_eq!(status, response.status());
        response
    }

    async fn provision(client: &Client, count: i64, status: Status) -> Vec<Voter> {
        let response = client
            .post(uri!(provision_voters))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&ProvisionRequest { count }).unwrap())
            .dispatch()
            .await;
        assert_eq!(status, response.status());
        if status == Status::Ok {
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
        } else {
            Vec::new()
        }
    }

    async fn start<'c>(client: &'c Client, name: Option<&str>) -> LocalResponse<'c> {
        let request = StartRequest {
            name: name.map(str::to_string),
        };
        client
            .post(uri!(start_election))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&request).unwrap())
            .dispatch()
            .await
    }
}
