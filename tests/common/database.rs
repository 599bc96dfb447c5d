//! Test database setup and management
//!
//! Integration tests run against a throwaway SQLite file so the suite
//! needs no external service; the handlers and the ballot transaction
//! run the same code paths they run against Postgres.
#![allow(dead_code)]

use once_cell::sync::Lazy;
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;
use urna::orm::{candidates, config, students, votes};

/// Admin code seeded into the test config row.
pub const TEST_ADMIN_CODE: &str = "admin123";

/// Backing file for the test database; lives for the whole test binary.
static TEST_DB_FILE: Lazy<NamedTempFile> =
    Lazy::new(|| NamedTempFile::new().expect("Failed to create test database file"));

static DB_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize the global pool once per test binary, pointing at the
/// scratch SQLite file, then migrate and seed.
async fn init_test_db() {
    if DB_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let url = format!("sqlite://{}?mode=rwc", TEST_DB_FILE.path().display());
    urna::db::init_db(url).await;

    let db = urna::db::get_db_pool();
    urna::db::migrate(db).await.expect("Failed to migrate");
    urna::db::seed_config(db, Some(TEST_ADMIN_CODE.to_string()))
        .await
        .expect("Failed to seed config");
}

/// Set up a clean database and return the shared connection. Tests are
/// `#[serial]`, so wiping between tests is safe.
pub async fn setup_test_database() -> &'static DatabaseConnection {
    init_test_db().await;
    let db = urna::db::get_db_pool();
    cleanup_test_data(db).await.expect("Failed to cleanup");
    db
}

/// Remove all election data and restore the config row to its seeded
/// state (election closed, known admin code).
pub async fn cleanup_test_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    votes::Entity::delete_many().exec(db).await?;
    students::Entity::delete_many().exec(db).await?;
    candidates::Entity::delete_many().exec(db).await?;

    config::ActiveModel {
        id: Set(config::SINGLETON_ID),
        school_name: Set("Institución Educativa".to_string()),
        logo_url: Set(None),
        election_status: Set(config::STATUS_CLOSED.to_string()),
        admin_code: Set(TEST_ADMIN_CODE.to_string()),
        updated_at: Set(chrono::Utc::now().naive_utc()),
    }
    .update(db)
    .await?;

    Ok(())
}
