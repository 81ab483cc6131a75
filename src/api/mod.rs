use rocket::Route;

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod public;
pub(crate) mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(public::routes());
    routes.extend(auth::routes());
    routes.extend(voter::routes());
    routes
}
