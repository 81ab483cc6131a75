#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{AdminFairing, ConfigFairing, StoreFairing};
use crate::election::Election;
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod election;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

/// Build the server, loading config and opening the election store on ignite.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(ConfigFairing)
        .attach(AdminFairing)
        .attach(StoreFairing)
        .attach(LoggerFairing)
        .mount("/", api::routes())
}

/// Build the server around an already-open election store.
pub fn rocket_for_election(election: Election) -> Rocket<Build> {
    rocket::build()
        .attach(ConfigFairing)
        .attach(AdminFairing)
        .attach(LoggerFairing)
        .manage(election)
        .mount("/", api::routes())
}
