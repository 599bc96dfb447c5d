//! The atomic vote-casting operation.
//!
//! Everything that must hold across concurrent requests lives in this one
//! transaction: a successful cast marks the student as having voted,
//! appends the anonymous vote row, and increments the candidate tally
//! together or not at all. The at-most-one-vote guarantee is a
//! compare-and-swap on `students.has_voted` (a conditional UPDATE whose
//! affected-row count decides the outcome), never a read-then-write pair
//! in application code.

use crate::orm::{candidates, config, students, votes};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    DbErr, EntityTrait, TransactionTrait,
};

/// Why a vote was not accepted.
#[derive(Debug)]
pub enum VoteError {
    ElectionClosed,
    CodeNotFound,
    AlreadyVoted,
    CandidateNotFound,
    Db(DbErr),
}

impl std::fmt::Display for VoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteError::ElectionClosed => write!(f, "Election is closed"),
            VoteError::CodeNotFound => write!(f, "Access code not found"),
            VoteError::AlreadyVoted => write!(f, "This code has already been used"),
            VoteError::CandidateNotFound => write!(f, "Candidate not found"),
            VoteError::Db(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for VoteError {}

impl From<DbErr> for VoteError {
    fn from(e: DbErr) -> Self {
        VoteError::Db(e)
    }
}

/// The student identity returned to the voter on success. Never includes
/// the access code or any other internal field.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VoterIdentity {
    pub name: String,
    pub grade: i32,
    pub course: i32,
}

impl From<&students::Model> for VoterIdentity {
    fn from(s: &students::Model) -> Self {
        Self {
            name: s.full_name.clone(),
            grade: s.grade,
            course: s.course,
        }
    }
}

#[derive(Debug)]
pub struct VoteReceipt {
    pub student: VoterIdentity,
    pub candidate_id: String,
}

/// Cast a vote. Exactly one call per access code can ever succeed.
///
/// Two concurrent casts of the same code serialize on the student row:
/// the second conditional UPDATE re-evaluates `has_voted = false` after
/// the first commits, affects zero rows, and reports `AlreadyVoted`.
pub async fn cast_vote(
    db: &DatabaseConnection,
    access_code: &str,
    candidate_id: &str,
) -> Result<VoteReceipt, VoteError> {
    let txn = db.begin().await?;

    let config = config::Entity::find_by_id(config::SINGLETON_ID)
        .one(&txn)
        .await?
        .ok_or_else(|| VoteError::Db(DbErr::Custom("config row is missing".to_string())))?;
    if !config.is_open() {
        return Err(VoteError::ElectionClosed);
    }

    let student = students::Entity::find()
        .filter(students::Column::AccessCode.eq(access_code))
        .one(&txn)
        .await?
        .ok_or(VoteError::CodeNotFound)?;

    let candidate = candidates::Entity::find_by_id(candidate_id.to_string())
        .one(&txn)
        .await?
        .ok_or(VoteError::CandidateNotFound)?;

    let now = Utc::now().naive_utc();

    // The CAS. Zero affected rows means another request spent this code.
    let marked = students::Entity::update_many()
        .col_expr(students::Column::HasVoted, Expr::value(true))
        .col_expr(students::Column::VotedAt, Expr::value(Some(now)))
        .filter(students::Column::Id.eq(student.id.clone()))
        .filter(students::Column::HasVoted.eq(false))
        .exec(&txn)
        .await?;
    if marked.rows_affected == 0 {
        return Err(VoteError::AlreadyVoted);
    }

    votes::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        candidate_id: Set(candidate.id.clone()),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    candidates::Entity::update_many()
        .col_expr(
            candidates::Column::Votes,
            Expr::col(candidates::Column::Votes).add(1),
        )
        .filter(candidates::Column::Id.eq(candidate.id.clone()))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(VoteReceipt {
        student: VoterIdentity::from(&student),
        candidate_id: candidate.id,
    })
}
