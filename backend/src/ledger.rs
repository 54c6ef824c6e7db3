// The voting ledger: everything that must hold for one-vote-per-voter
// lives in this transaction.

use diesel::OptionalExtension;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket_db_pools::diesel::prelude::*;
use rocket_db_pools::diesel::{AsyncConnection, AsyncMysqlConnection};
use scoped_futures::ScopedFutureExt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewVote, Student, Voter};
use crate::schema::{students, voters, votes};
use crate::validation::CastVote;

#[derive(Debug, Error)]
pub enum CastVoteError {
    #[error("Voter not found")]
    VoterNotFound,
    #[error("Student not found")]
    StudentNotFound,
    #[error("You have already voted")]
    AlreadyVoted,
    #[error(transparent)]
    Database(#[from] DieselError),
}

/// Casts a vote inside a single transaction: the vote row, the voter's
/// spent flag and the student's counter commit together or not at all.
///
/// Two concurrent calls for the same voter both reach the conditional
/// update, but only one affects a row; the loser gets `AlreadyVoted`
/// and its transaction rolls back without touching the counter.
pub async fn cast_vote(
    conn: &mut AsyncMysqlConnection,
    cmd: CastVote,
) -> Result<(Voter, Student), CastVoteError> {
    conn.transaction::<_, CastVoteError, _>(|conn| {
        async move {
            let voter = voters::table
                .find(&cmd.voter_id)
                .select(Voter::as_select())
                .first::<Voter>(conn)
                .await
                .optional()?
                .ok_or(CastVoteError::VoterNotFound)?;

            // Early rejection before the student lookup: a spent voter
            // naming a bogus student still gets 409, not 404.
            if voter.has_voted {
                return Err(CastVoteError::AlreadyVoted);
            }

            students::table
                .find(&cmd.student_id)
                .select(Student::as_select())
                .first::<Student>(conn)
                .await
                .optional()?
                .ok_or(CastVoteError::StudentNotFound)?;

            // The claim: one conditional write decides the race. Zero
            // rows affected means a concurrent vote got there first.
            let claimed = diesel::update(
                voters::table
                    .filter(voters::id.eq(&cmd.voter_id))
                    .filter(voters::has_voted.eq(false)),
            )
            .set((
                voters::has_voted.eq(true),
                voters::voted_for_id.eq(Some(cmd.student_id.clone())),
            ))
            .execute(conn)
            .await?;

            if claimed == 0 {
                return Err(CastVoteError::AlreadyVoted);
            }

            let new_vote = NewVote {
                id: Uuid::new_v4().to_string(),
                voter_id: cmd.voter_id.clone(),
                student_id: cmd.student_id.clone(),
            };

            // The unique key on votes.voter_id backstops the claim at
            // the storage level.
            match diesel::insert_into(votes::table)
                .values(&new_vote)
                .execute(conn)
                .await
            {
                Ok(_) => {}
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    return Err(CastVoteError::AlreadyVoted);
                }
                Err(e) => return Err(e.into()),
            }

            // In-SQL increment; never read-modify-write.
            diesel::update(students::table.find(&cmd.student_id))
                .set(students::vote_count.eq(students::vote_count + 1))
                .execute(conn)
                .await?;

            let voter = voters::table
                .find(&cmd.voter_id)
                .select(Voter::as_select())
                .first::<Voter>(conn)
                .await?;
            let student = students::table
                .find(&cmd.student_id)
                .select(Student::as_select())
                .first::<Student>(conn)
                .await?;

            Ok((voter, student))
        }
        .scope_boxed()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_match_the_api_contract() {
        assert_eq!(CastVoteError::VoterNotFound.to_string(), "Voter not found");
        assert_eq!(
            CastVoteError::StudentNotFound.to_string(),
            "Student not found"
        );
        assert_eq!(
            CastVoteError::AlreadyVoted.to_string(),
            "You have already voted"
        );
    }
}
