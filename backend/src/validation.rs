// Boundary validation. Each request body is converted into a typed
// command before any handler logic runs; the error lists name the JSON
// fields the client sent.

use crate::models::{CastVoteRequest, RegisterVoterRequest, SubmitStudentRequest};

/// Structural email check shared by voter registration and login.
///
/// Not an RFC parser: one `@`, a non-empty local part, a dotted domain
/// and no whitespace is enough to keep unreachable addresses out.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterVoter {
    pub name: String,
    pub email: String,
}

impl TryFrom<RegisterVoterRequest> for RegisterVoter {
    type Error = Vec<String>;

    fn try_from(req: RegisterVoterRequest) -> Result<Self, Self::Error> {
        let name = req.name.trim().to_string();
        let email = req.email.trim().to_string();

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push("name must not be empty".to_string());
        }
        if !is_valid_email(&email) {
            errors.push("email must be a valid address".to_string());
        }

        if errors.is_empty() {
            Ok(RegisterVoter { name, email })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitStudent {
    pub name: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

impl TryFrom<SubmitStudentRequest> for SubmitStudent {
    type Error = Vec<String>;

    fn try_from(req: SubmitStudentRequest) -> Result<Self, Self::Error> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(vec!["name must not be empty".to_string()]);
        }

        Ok(SubmitStudent {
            name,
            description: req.description,
            photo_url: req.photo_url,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastVote {
    pub voter_id: String,
    pub student_id: String,
}

impl TryFrom<CastVoteRequest> for CastVote {
    type Error = Vec<String>;

    fn try_from(req: CastVoteRequest) -> Result<Self, Self::Error> {
        let voter_id = req.voter_id.trim().to_string();
        let student_id = req.student_id.trim().to_string();

        let mut errors = Vec::new();
        if voter_id.is_empty() {
            errors.push("voterId must not be empty".to_string());
        }
        if student_id.is_empty() {
            errors.push("studentId must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(CastVote {
                voter_id,
                student_id,
            })
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        for email in ["a@x.com", "amina.b@lycee20.edu.ma", "x_y+tag@mail.co"] {
            assert!(is_valid_email(email), "expected {email} to be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "",
            "plainaddress",
            "@x.com",
            "a@",
            "a@nodot",
            "a@.com",
            "a@x.",
            "two@@x.com",
            "a b@x.com",
        ] {
            assert!(!is_valid_email(email), "expected {email} to be invalid");
        }
    }

    #[test]
    fn register_voter_trims_fields() {
        let cmd = RegisterVoter::try_from(RegisterVoterRequest {
            name: "  Amina ".to_string(),
            email: " a@x.com ".to_string(),
        })
        .unwrap();
        assert_eq!(cmd.name, "Amina");
        assert_eq!(cmd.email, "a@x.com");
    }

    #[test]
    fn register_voter_collects_every_field_error() {
        let errors = RegisterVoter::try_from(RegisterVoterRequest {
            name: "   ".to_string(),
            email: "not-an-email".to_string(),
        })
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("name"));
        assert!(errors[1].contains("email"));
    }

    #[test]
    fn submit_student_requires_a_name() {
        let errors = SubmitStudent::try_from(SubmitStudentRequest {
            name: "".to_string(),
            description: Some("desc".to_string()),
            photo_url: None,
        })
        .unwrap_err();
        assert_eq!(errors, vec!["name must not be empty".to_string()]);
    }

    #[test]
    fn submit_student_passes_optionals_through() {
        let cmd = SubmitStudent::try_from(SubmitStudentRequest {
            name: "Sami".to_string(),
            description: Some("Robotics entry".to_string()),
            photo_url: Some("https://example.com/s.jpg".to_string()),
        })
        .unwrap();
        assert_eq!(cmd.description.as_deref(), Some("Robotics entry"));
        assert_eq!(cmd.photo_url.as_deref(), Some("https://example.com/s.jpg"));
    }

    #[test]
    fn cast_vote_requires_both_ids() {
        let errors = CastVote::try_from(CastVoteRequest {
            voter_id: "".to_string(),
            student_id: " ".to_string(),
        })
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
