use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::json;
use thiserror::Error;

use crate::ledger::CastVoteError;

/// API-level error rendered as a `{"message": ...}` JSON body with the
/// matching status. Validation failures additionally carry the list of
/// field errors under `"errors"`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: &'static str,
        errors: Vec<String>,
    },
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation { .. } => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::Unauthorized(_) => Status::Unauthorized,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl From<CastVoteError> for ApiError {
    fn from(err: CastVoteError) -> Self {
        match err {
            CastVoteError::VoterNotFound => ApiError::NotFound("Voter not found"),
            CastVoteError::StudentNotFound => ApiError::NotFound("Student not found"),
            CastVoteError::AlreadyVoted => ApiError::Conflict("You have already voted"),
            CastVoteError::Database(e) => {
                eprintln!("Error casting vote: {}", e);
                ApiError::Internal("Failed to cast vote")
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        let body = match &self {
            ApiError::Validation { message, errors } => {
                json!({ "message": message, "errors": errors })
            }
            other => json!({ "message": other.to_string() }),
        }
        .to_string();

        Response::build()
            .status(self.status())
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        let validation = ApiError::Validation {
            message: "Invalid voter data",
            errors: vec!["email must be a valid address".to_string()],
        };
        assert_eq!(validation.status(), Status::BadRequest);
        assert_eq!(
            ApiError::NotFound("Voter not found").status(),
            Status::NotFound
        );
        assert_eq!(
            ApiError::Conflict("You have already voted").status(),
            Status::Conflict
        );
        assert_eq!(
            ApiError::Unauthorized("Invalid username or password").status(),
            Status::Unauthorized
        );
        assert_eq!(
            ApiError::Internal("Failed to fetch students").status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn cast_vote_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(CastVoteError::AlreadyVoted),
            ApiError::Conflict("You have already voted")
        ));
        assert!(matches!(
            ApiError::from(CastVoteError::VoterNotFound),
            ApiError::NotFound("Voter not found")
        ));
        assert!(matches!(
            ApiError::from(CastVoteError::StudentNotFound),
            ApiError::NotFound("Student not found")
        ));
    }
}
