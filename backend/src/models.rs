use chrono::NaiveDateTime;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::diesel::prelude::*;

use crate::schema::{admin_sessions, students, voters, votes};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = students)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub vote_count: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = students)]
pub struct NewStudent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = voters)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct Voter {
    pub id: String,
    pub name: String,
    pub email: String,
    pub has_voted: bool,
    pub voted_for_id: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = voters)]
pub struct NewVoter {
    pub id: String,
    pub name: String,
    pub email: String,
}

// Vote rows are append-only: the application writes them and never
// reads them back, so only the insert model exists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = votes)]
pub struct NewVote {
    pub id: String,
    pub voter_id: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = admin_sessions)]
pub struct AdminSession {
    pub session_token: String,
    pub created_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admin_sessions)]
pub struct NewAdminSession {
    pub session_token: String,
    pub expires_at: Option<NaiveDateTime>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct RegisterVoterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct VoterLoginRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct SubmitStudentRequest {
    pub name: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub voter_id: String,
    pub student_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AdminLoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CastVoteResponse {
    pub voter: Voter,
    pub student: Student,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_json_uses_camel_case() {
        let student = Student {
            id: "s-1".to_string(),
            name: "Sami".to_string(),
            description: None,
            photo_url: Some("https://example.com/sami.jpg".to_string()),
            vote_count: 3,
            is_active: true,
        };

        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["voteCount"], 3);
        assert_eq!(json["photoUrl"], "https://example.com/sami.jpg");
        assert_eq!(json["isActive"], true);
        assert!(json.get("vote_count").is_none());
    }

    #[test]
    fn voter_json_uses_camel_case() {
        let voter = Voter {
            id: "v-1".to_string(),
            name: "Amina".to_string(),
            email: "a@x.com".to_string(),
            has_voted: true,
            voted_for_id: Some("s-1".to_string()),
        };

        let json = serde_json::to_value(&voter).unwrap();
        assert_eq!(json["hasVoted"], true);
        assert_eq!(json["votedForId"], "s-1");
    }

    #[test]
    fn cast_vote_request_reads_camel_case() {
        let req: CastVoteRequest =
            serde_json::from_str(r#"{"voterId":"v-1","studentId":"s-1"}"#).unwrap();
        assert_eq!(req.voter_id, "v-1");
        assert_eq!(req.student_id, "s-1");
    }

    #[test]
    fn submit_student_request_allows_missing_optionals() {
        let req: SubmitStudentRequest = serde_json::from_str(r#"{"name":"Sami"}"#).unwrap();
        assert_eq!(req.name, "Sami");
        assert!(req.description.is_none());
        assert!(req.photo_url.is_none());
    }
}
