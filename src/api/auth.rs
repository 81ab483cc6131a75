use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    election::Election,
    error::{Error, Result},
    model::{
        admin::{AdminCredentials, AdminRoster},
        auth::{AuthToken, AUTH_TOKEN_COOKIE},
        voter::VoterCredentials,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![authenticate_admin, authenticate_voter, logout]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn authenticate_admin(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admins: &State<AdminRoster>,
    config: &State<Config>,
) -> Result<()> {
    let admin = admins.authenticate(&credentials).ok_or_else(|| {
        Error::Unauthorized(
            "No admin found with the provided username and password combination.".to_string(),
        )
    })?;

    let token = AuthToken::new(admin);
    cookies.add(token.into_cookie(config)?);
    info!("Admin '{}' signed in", admin.username);

    Ok(())
}

#[post("/auth/voter", data = "<credentials>", format = "json")]
pub async fn authenticate_voter(
    cookies: &CookieJar<'_>,
    credentials: Json<VoterCredentials>,
    election: &State<Election>,
    config: &State<Config>,
) -> Result<()> {
    let voter = election.validate_voter(&credentials)?.ok_or_else(|| {
        Error::Unauthorized("No voter found with the provided handle and secret.".to_string())
    })?;

    let token = AuthToken::new(&voter);
    cookies.add(token.into_cookie(config)?);

    Ok(())
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::serde_json::json};

    use crate::model::{admin::Admin, voter::Voter};

    use super::*;

    #[backend_test]
    async fn admin_authenticate_valid(client: Client) {
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn admin_authenticate_invalid(client: Client) {
        // Use invalid username to attempt admin login
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::empty()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        // Use invalid password to attempt admin login
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(
                json! ({
                    "username": &AdminCredentials::example().username,
                    "password": "",
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn voter_authenticate(client: Client, election: Election) {
        let voters = election.provision_voters(2).unwrap();

        let response = client
            .post(uri!(authenticate_voter))
            .header(ContentType::JSON)
            .body(json!(VoterCredentials::from(&voters[1])).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let cookies = client.cookies();
        let cookie = cookies.get(AUTH_TOKEN_COOKIE).unwrap();
        let config = client.rocket().state::<Config>().unwrap();
        let token = AuthToken::<Voter>::from_cookie(cookie, config).unwrap();
        assert_eq!(token.id, voters[1].id);
    }

    #[backend_test]
    async fn voter_authenticate_invalid(client: Client, election: Election) {
        let voters = election.provision_voters(1).unwrap();

        for (handle, secret) in [(voters[0].handle.as_str(), "wrong"), ("USN404", "123")] {
            let response = client
                .post(uri!(authenticate_voter))
                .header(ContentType::JSON)
                .body(json!({ "handle": handle, "secret": secret }).to_string())
                .dispatch()
                .await;

            assert_eq!(Status::Unauthorized, response.status());
            assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
        }
    }

    #[backend_test(admin)]
    async fn admin_session_survives_setup(client: Client, election: Election) {
        let cookies = client.cookies();
        let cookie = cookies.get(AUTH_TOKEN_COOKIE).unwrap();
        let config = client.rocket().state::<Config>().unwrap();
        assert!(AuthToken::<Admin>::from_cookie(cookie, config).is_ok());

        // The session is live for admin-only routes on the same store.
        let response = client.get("/voters").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(election.voters().unwrap().is_empty());
    }

    #[backend_test(admin)]
    async fn logout_admin(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test(voter)]
    async fn logout_voter(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn logout_not_logged_in(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
    }
}
