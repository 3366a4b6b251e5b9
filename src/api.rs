use rocket::Route;

mod admin;
mod common;
mod maintenance;
mod pairs;
mod public;
mod voters;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(pairs::routes());
    routes.extend(voters::routes());
    routes.extend(maintenance::routes());
    routes.extend(public::routes());
    routes
}
