//! Database pool, schema migration, and config-row seeding.
//!
//! The pool is process-global, matching how the rest of the crate reaches
//! the database (`get_db_pool()` from stateless handlers). Schema setup is
//! a handful of portable `CREATE TABLE IF NOT EXISTS` statements so the
//! same code paths run against Postgres in production and SQLite in tests.

use crate::orm::config;
use chrono::Utc;
use once_cell::sync::OnceCell;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DbErr, EntityTrait, Statement,
};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect the global pool. Must be called once before any handler runs.
pub async fn init_db(database_url: String) {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(16).sqlx_logging(false);

    let pool = Database::connect(opt)
        .await
        .expect("Failed to connect to database.");

    DB_POOL
        .set(pool)
        .expect("init_db() called more than once.");
}

pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("init_db() has not been called.")
}

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS students (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        grade INTEGER NOT NULL,
        course INTEGER NOT NULL,
        list_number INTEGER NOT NULL,
        access_code TEXT NOT NULL UNIQUE,
        has_voted BOOLEAN NOT NULL DEFAULT FALSE,
        voted_at TIMESTAMP NULL,
        created_at TIMESTAMP NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS candidates (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        party TEXT NOT NULL DEFAULT '',
        photo_url TEXT NULL,
        votes INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS votes (
        id TEXT PRIMARY KEY,
        candidate_id TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS config (
        id INTEGER PRIMARY KEY,
        school_name TEXT NOT NULL,
        logo_url TEXT NULL,
        election_status TEXT NOT NULL,
        admin_code TEXT NOT NULL,
        updated_at TIMESTAMP NOT NULL
    )",
];

/// Create the schema if it does not exist yet.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for ddl in TABLES {
        db.execute(Statement::from_string(backend, ddl.to_string()))
            .await?;
    }
    Ok(())
}

/// Ensure the config singleton row exists.
///
/// On first boot the admin code comes from `admin_code` (the `ADMIN_CODE`
/// environment variable in production); without one, a random code is
/// generated and logged so the install is never left open with a known
/// default secret.
pub async fn seed_config(
    db: &DatabaseConnection,
    admin_code: Option<String>,
) -> Result<(), DbErr> {
    if config::Entity::find_by_id(config::SINGLETON_ID)
        .one(db)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let admin_code = admin_code.unwrap_or_else(|| {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        log::warn!(
            "ADMIN_CODE was not set. Generated admin code for this install: {}",
            code
        );
        code
    });

    config::ActiveModel {
        id: Set(config::SINGLETON_ID),
        school_name: Set("Institución Educativa".to_string()),
        logo_url: Set(None),
        election_status: Set(config::STATUS_CLOSED.to_string()),
        admin_code: Set(admin_code),
        updated_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await?;

    Ok(())
}

/// Fetch the config singleton row. Its absence after seeding is a
/// deployment fault, reported as a database error.
pub async fn get_config(db: &DatabaseConnection) -> Result<config::Model, DbErr> {
    config::Entity::find_by_id(config::SINGLETON_ID)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::Custom("config row is missing".to_string()))
}
