use diesel::OptionalExtension;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;
use uuid::Uuid;

use crate::db::ChallengeDb;
use crate::error::ApiError;
use crate::ledger;
use crate::models::{
    CastVoteRequest, CastVoteResponse, NewStudent, NewVoter, RegisterVoterRequest, Student,
    SubmitStudentRequest, Voter, VoterLoginRequest,
};
use crate::schema::{students, voters};
use crate::validation::{CastVote, RegisterVoter, SubmitStudent, is_valid_email};

// Route to get all students, leaderboard order
#[get("/students")]
pub async fn get_students(mut db: Connection<ChallengeDb>) -> Result<Json<Vec<Student>>, ApiError> {
    let results = students::table
        .order(students::vote_count.desc())
        .select(Student::as_select())
        .load::<Student>(&mut db)
        .await
        .map_err(|e| {
            eprintln!("Error loading students: {}", e);
            ApiError::Internal("Failed to fetch students")
        })?;

    Ok(Json(results))
}

// Route to get a single student
#[get("/students/<id>")]
pub async fn get_student(
    mut db: Connection<ChallengeDb>,
    id: &str,
) -> Result<Json<Student>, ApiError> {
    let student = students::table
        .find(id)
        .select(Student::as_select())
        .first::<Student>(&mut db)
        .await
        .optional()
        .map_err(|e| {
            eprintln!("Error loading student: {}", e);
            ApiError::Internal("Failed to fetch student")
        })?
        .ok_or(ApiError::NotFound("Student not found"))?;

    Ok(Json(student))
}

// Route to submit a new entry. Deliberately ungated: anyone can enter
// the challenge.
#[post("/students", format = "json", data = "<student_request>")]
pub async fn submit_student(
    mut db: Connection<ChallengeDb>,
    student_request: Json<SubmitStudentRequest>,
) -> Result<(Status, Json<Student>), ApiError> {
    let cmd = SubmitStudent::try_from(student_request.into_inner()).map_err(|errors| {
        ApiError::Validation {
            message: "Invalid student data",
            errors,
        }
    })?;

    let new_student = NewStudent {
        id: Uuid::new_v4().to_string(),
        name: cmd.name,
        description: cmd.description,
        photo_url: cmd.photo_url,
    };

    diesel::insert_into(students::table)
        .values(&new_student)
        .execute(&mut db)
        .await
        .map_err(|e| {
            eprintln!("Error creating student: {}", e);
            ApiError::Internal("Failed to create student")
        })?;

    // MySQL has no RETURNING; re-select by the id we generated.
    let student = students::table
        .find(&new_student.id)
        .select(Student::as_select())
        .first::<Student>(&mut db)
        .await
        .map_err(|e| {
            eprintln!("Error loading created student: {}", e);
            ApiError::Internal("Failed to create student")
        })?;

    Ok((Status::Created, Json(student)))
}

// Route to register a voter
#[post("/voters", format = "json", data = "<voter_request>")]
pub async fn register_voter(
    mut db: Connection<ChallengeDb>,
    voter_request: Json<RegisterVoterRequest>,
) -> Result<(Status, Json<Voter>), ApiError> {
    let cmd = RegisterVoter::try_from(voter_request.into_inner()).map_err(|errors| {
        ApiError::Validation {
            message: "Invalid voter data",
            errors,
        }
    })?;

    let existing = voters::table
        .filter(voters::email.eq(&cmd.email))
        .count()
        .get_result::<i64>(&mut db)
        .await
        .map_err(|e| {
            eprintln!("Error checking voter email: {}", e);
            ApiError::Internal("Failed to register voter")
        })?;

    if existing > 0 {
        return Err(ApiError::Conflict("Email already registered"));
    }

    let new_voter = NewVoter {
        id: Uuid::new_v4().to_string(),
        name: cmd.name,
        email: cmd.email,
    };

    // The unique key on email backstops the pre-check when two
    // registrations race.
    match diesel::insert_into(voters::table)
        .values(&new_voter)
        .execute(&mut db)
        .await
    {
        Ok(_) => {}
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(ApiError::Conflict("Email already registered"));
        }
        Err(e) => {
            eprintln!("Error registering voter: {}", e);
            return Err(ApiError::Internal("Failed to register voter"));
        }
    }

    let voter = voters::table
        .find(&new_voter.id)
        .select(Voter::as_select())
        .first::<Voter>(&mut db)
        .await
        .map_err(|e| {
            eprintln!("Error loading registered voter: {}", e);
            ApiError::Internal("Failed to register voter")
        })?;

    Ok((Status::Created, Json(voter)))
}

// Route to log a voter in. Pure lookup: knowing the registered email is
// the whole authentication.
#[post("/voters/login", format = "json", data = "<login_request>")]
pub async fn login_voter(
    mut db: Connection<ChallengeDb>,
    login_request: Json<VoterLoginRequest>,
) -> Result<Json<Voter>, ApiError> {
    let email = login_request.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(ApiError::Validation {
            message: "Invalid email",
            errors: vec!["email must be a valid address".to_string()],
        });
    }

    let voter = voters::table
        .filter(voters::email.eq(&email))
        .select(Voter::as_select())
        .first::<Voter>(&mut db)
        .await
        .optional()
        .map_err(|e| {
            eprintln!("Error logging voter in: {}", e);
            ApiError::Internal("Failed to login")
        })?
        .ok_or(ApiError::NotFound("Email not found. Please register first."))?;

    Ok(Json(voter))
}

// Route to cast a vote
#[post("/votes", format = "json", data = "<vote_request>")]
pub async fn cast_vote(
    mut db: Connection<ChallengeDb>,
    vote_request: Json<CastVoteRequest>,
) -> Result<(Status, Json<CastVoteResponse>), ApiError> {
    let cmd = CastVote::try_from(vote_request.into_inner()).map_err(|errors| {
        ApiError::Validation {
            message: "Invalid vote data",
            errors,
        }
    })?;

    let (voter, student) = ledger::cast_vote(&mut db, cmd).await?;

    Ok((Status::Created, Json(CastVoteResponse { voter, student })))
}
