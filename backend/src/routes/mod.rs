// Routes module - organizes all HTTP route handlers

pub mod voting;

use std::path::Path;

use rocket::Request;
use rocket::fs::NamedFile;
use rocket::serde::json::{Value, json};

use crate::AppState;

/// 404 error handler - serves the front end's 404.html page when the
/// static directory provides one
#[catch(404)]
pub async fn not_found(req: &Request<'_>) -> Option<NamedFile> {
    let state = req.rocket().state::<AppState>()?;
    NamedFile::open(Path::new(&state.static_dir).join("404.html"))
        .await
        .ok()
}

#[catch(401)]
pub fn unauthorized() -> Value {
    json!({ "message": "Unauthorized - Admin access required" })
}
