// Main application entry point

#[macro_use]
extern crate rocket;

mod config;
mod db;
mod error;
mod ledger;
mod models;
mod routes;
mod schema;
#[cfg(test)]
mod tests;
mod validation;

use std::path::Path;

use rocket::fairing::AdHoc;
use rocket::fs::FileServer;
use rocket_db_pools::Database;

use config::AppConfig;
use db::ChallengeDb;
use routes::voting::{admin, client};

/// Per-process application state: admin credentials for the login
/// route and paths the fairings and catchers need.
pub struct AppState {
    pub database_url: String,
    pub admin_username: String,
    pub admin_password_hash: String,
    pub static_dir: String,
}

#[rocket::launch]
fn rocket() -> _ {
    build_rocket(AppConfig::load())
}

fn build_rocket(app_config: AppConfig) -> rocket::Rocket<rocket::Build> {
    let figment = rocket::config::Config::figment()
        .merge(("port", app_config.rocket_port))
        .merge((
            "databases.challenge_db",
            rocket_db_pools::Config {
                url: app_config.database_url.clone(),
                min_connections: None,
                max_connections: 1024,
                connect_timeout: 3,
                idle_timeout: None,
                extensions: None,
            },
        ));

    let static_dir = app_config.static_dir.clone();

    let state = AppState {
        database_url: app_config.database_url,
        admin_username: app_config.admin_username,
        admin_password_hash: app_config.admin_password_hash,
        static_dir: static_dir.clone(),
    };

    let mut rocket = rocket::custom(figment)
        .manage(state)
        .attach(ChallengeDb::init())
        .attach(AdHoc::on_ignite("Database Migrations", db::run_migrations))
        .attach(AdHoc::on_ignite("Student Seeding", db::run_seeding))
        .mount(
            "/api",
            routes![
                client::get_students,
                client::get_student,
                client::submit_student,
                client::register_voter,
                client::login_voter,
                client::cast_vote,
                admin::admin_login,
                admin::admin_logout,
                admin::admin_check,
                admin::get_voters,
                admin::delete_student,
            ],
        )
        .register("/", catchers![routes::not_found, routes::unauthorized]);

    if Path::new(&static_dir).is_dir() {
        rocket = rocket.mount("/", FileServer::from(static_dir));
    }

    rocket
}
