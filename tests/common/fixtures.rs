//! Test fixtures for creating election data
#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};
use urna::codes;
use urna::orm::{candidates, config, students};

/// Create a student whose access code follows the standard formula.
pub async fn create_test_student(
    db: &DatabaseConnection,
    full_name: &str,
    grade: i32,
    course: i32,
    list_number: i32,
) -> Result<students::Model, DbErr> {
    students::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        full_name: Set(full_name.to_string()),
        grade: Set(grade),
        course: Set(course),
        list_number: Set(list_number),
        access_code: Set(codes::access_code(grade, course, list_number)),
        has_voted: Set(false),
        voted_at: Set(None),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
}

pub async fn create_test_candidate(
    db: &DatabaseConnection,
    name: &str,
    party: &str,
) -> Result<candidates::Model, DbErr> {
    candidates::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        party: Set(party.to_string()),
        photo_url: Set(None),
        votes: Set(0),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
}

pub async fn set_election_status(db: &DatabaseConnection, status: &str) -> Result<(), DbErr> {
    config::ActiveModel {
        id: Set(config::SINGLETON_ID),
        election_status: Set(status.to_string()),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

pub async fn open_election(db: &DatabaseConnection) -> Result<(), DbErr> {
    set_election_status(db, config::STATUS_OPEN).await
}
