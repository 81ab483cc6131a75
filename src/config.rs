use chrono::Duration;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::election::{Election, ElectionOptions, DEFAULT_VOTER_SECRET};
use crate::model::{
    admin::{AdminCredentials, AdminRoster},
    settings::ResetPolicy,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    #[serde(default = "default_voter_secret")]
    voter_secret: String,
    #[serde(default)]
    reset_policy: ResetPolicy,
    // secrets
    jwt_secret: String,
}

fn default_voter_secret() -> String {
    DEFAULT_VOTER_SECRET.to_string()
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Secret issued to newly provisioned voters.
    pub fn voter_secret(&self) -> &str {
        &self.voter_secret
    }

    /// What a reset does to the rosters.
    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    pub fn election_options(&self) -> ElectionOptions {
        ElectionOptions {
            reset_policy: self.reset_policy,
            voter_secret: self.voter_secret.clone(),
        }
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Admin accounts, injected from configuration.
#[derive(Deserialize)]
struct AdminConfig {
    // secrets
    admins: Vec<AdminCredentials>,
}

/// A fairing that loads the configured admin accounts, hashes their
/// passwords, and places the resulting `AdminRoster` into managed state.
pub struct AdminFairing;

#[rocket::async_trait]
impl Fairing for AdminFairing {
    fn info(&self) -> Info {
        Info {
            name: "Admins",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<AdminConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load admin config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Hash the passwords.
        let roster = match AdminRoster::from_credentials(config.admins) {
            Ok(roster) => roster,
            Err(e) => {
                error!("Failed to set up admins: {e}");
                return Err(rocket);
            }
        };
        info!("Loaded {} admin account(s)", roster.len());

        // Manage the state.
        rocket = rocket.manage(roster);
        Ok(rocket)
    }
}

/// Configuration for the election store.
#[derive(Deserialize)]
struct StoreConfig {
    /// Where to mirror the store; purely in-memory if absent.
    #[serde(default)]
    state_path: Option<String>,
}

/// A fairing that opens the election store, resuming from its snapshot file
/// if one is configured, and places the `Election` into managed state.
/// Must be attached after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let options = match rocket.state::<Config>() {
            Some(app_config) => app_config.election_options(),
            None => {
                error!("Application config must be loaded before the election store");
                return Err(rocket);
            }
        };

        // Open the store.
        let election = match config.state_path {
            Some(path) => {
                info!("Opening election store at {path}...");
                match Election::open(path, options) {
                    Ok(election) => election,
                    Err(e) => {
                        error!("Failed to open election store: {e}");
                        return Err(rocket);
                    }
                }
            }
            None => {
                warn!("No `state_path` configured; election state will not survive a restart");
                Election::new(options)
            }
        };
        info!("...election store online!");

        // Manage the state.
        rocket = rocket.manage(election);
        Ok(rocket)
    }
}
