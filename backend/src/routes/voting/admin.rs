use bcrypt::verify;
use chrono::{Duration, Utc};
use diesel::OptionalExtension;
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;
use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;
use uuid::Uuid;

use crate::AppState;
use crate::db::ChallengeDb;
use crate::error::ApiError;
use crate::models::{AdminLoginRequest, AdminLoginResponse, AdminSession, NewAdminSession, Voter};
use crate::schema::{admin_sessions, students, voters};

const ADMIN_COOKIE: &str = "admin_auth";
const SESSION_HOURS: i64 = 24;

/// Proof of a live admin session, resolved per request from the
/// admin_sessions table. Gated routes take this as a guard; a missing
/// or expired session becomes a 401 before the handler runs.
pub struct AdminUser {
    pub session_token: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(cookie) = req.cookies().get(ADMIN_COOKIE) else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let mut db = match req.guard::<Connection<ChallengeDb>>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let session = admin_sessions::table
            .find(cookie.value())
            .select(AdminSession::as_select())
            .first::<AdminSession>(&mut db)
            .await
            .optional();

        match session {
            Ok(Some(session)) => {
                // Expired rows are treated as absent.
                let expired = session
                    .expires_at
                    .is_some_and(|exp| exp <= Utc::now().naive_utc());
                if expired {
                    Outcome::Error((Status::Unauthorized, ()))
                } else {
                    Outcome::Success(AdminUser {
                        session_token: session.session_token,
                    })
                }
            }
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                eprintln!("Error loading admin session: {}", e);
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

fn credentials_ok(state: &AppState, username: &str, password: &str) -> bool {
    username == state.admin_username
        && verify(password, &state.admin_password_hash).unwrap_or(false)
}

// Admin login endpoint
#[post("/admin/login", format = "json", data = "<login>")]
pub async fn admin_login(
    mut db: Connection<ChallengeDb>,
    state: &State<AppState>,
    cookies: &CookieJar<'_>,
    remote: Option<std::net::IpAddr>,
    login: Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    if credentials_ok(state, &login.username, &login.password) {
        let token = Uuid::new_v4().to_string();
        let new_session = NewAdminSession {
            session_token: token.clone(),
            expires_at: Some(Utc::now().naive_utc() + Duration::hours(SESSION_HOURS)),
            ip_address: remote.map(|ip| ip.to_string()),
        };

        diesel::insert_into(admin_sessions::table)
            .values(&new_session)
            .execute(&mut db)
            .await
            .map_err(|e| {
                eprintln!("Error creating admin session: {}", e);
                ApiError::Internal("Login failed")
            })?;

        let mut cookie = Cookie::new(ADMIN_COOKIE, token);
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookies.add(cookie);

        Ok(Json(AdminLoginResponse {
            success: true,
            message: "Login successful".to_string(),
        }))
    } else {
        // Clear any existing invalid cookie
        cookies.remove(Cookie::from(ADMIN_COOKIE));
        Err(ApiError::Unauthorized("Invalid username or password"))
    }
}

// Admin logout endpoint
#[post("/admin/logout")]
pub async fn admin_logout(
    mut db: Connection<ChallengeDb>,
    cookies: &CookieJar<'_>,
) -> Result<Status, Status> {
    if let Some(cookie) = cookies.get(ADMIN_COOKIE) {
        let token = cookie.value();
        diesel::delete(admin_sessions::table.find(token))
            .execute(&mut db)
            .await
            .ok();
        cookies.remove(Cookie::from(ADMIN_COOKIE));
    }
    Ok(Status::Ok)
}

// Check if admin is authenticated
#[get("/admin/check")]
pub async fn admin_check(admin: Option<AdminUser>) -> Json<bool> {
    Json(admin.is_some())
}

// Route to get all voters (admin view) - requires authentication
#[get("/voters")]
pub async fn get_voters(
    _admin: AdminUser,
    mut db: Connection<ChallengeDb>,
) -> Result<Json<Vec<Voter>>, ApiError> {
    let results = voters::table
        .select(Voter::as_select())
        .load::<Voter>(&mut db)
        .await
        .map_err(|e| {
            eprintln!("Error loading voters: {}", e);
            ApiError::Internal("Failed to fetch voters")
        })?;

    Ok(Json(results))
}

// Route to delete a student entry - requires authentication.
// Existing vote rows and voted_for_id references stay behind; the audit
// trail outlives the entry.
#[delete("/students/<id>")]
pub async fn delete_student(
    _admin: AdminUser,
    mut db: Connection<ChallengeDb>,
    id: &str,
) -> Result<Status, ApiError> {
    diesel::delete(students::table.find(id))
        .execute(&mut db)
        .await
        .map_err(|e| {
            eprintln!("Error deleting student: {}", e);
            ApiError::Internal("Failed to delete student")
        })?;

    // Idempotent: deleting an unknown id is still a 204.
    Ok(Status::NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_password(password: &str) -> AppState {
        AppState {
            database_url: "mysql://unused".to_string(),
            admin_username: "admin".to_string(),
            admin_password_hash: bcrypt::hash(password, 4).unwrap(),
            static_dir: "static".to_string(),
        }
    }

    #[test]
    fn matching_credentials_pass() {
        let state = state_with_password("admin123");
        assert!(credentials_ok(&state, "admin", "admin123"));
    }

    #[test]
    fn wrong_password_fails() {
        let state = state_with_password("admin123");
        assert!(!credentials_ok(&state, "admin", "hunter2"));
    }

    #[test]
    fn wrong_username_fails_even_with_right_password() {
        let state = state_with_password("admin123");
        assert!(!credentials_ok(&state, "root", "admin123"));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        let state = AppState {
            database_url: "mysql://unused".to_string(),
            admin_username: "admin".to_string(),
            admin_password_hash: "not-a-bcrypt-hash".to_string(),
            static_dir: "static".to_string(),
        };
        assert!(!credentials_ok(&state, "admin", "admin123"));
    }
}
