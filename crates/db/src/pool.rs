//! SQLite connection pool and embedded schema.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::DbError;

/// Type alias for the shared SQLite pool used across the whole application.
pub type DbPool = Pool<Sqlite>;

/// Embedded DDL, applied with `init_schema`. Foreign keys are declared
/// without `ON DELETE CASCADE`: child rows are removed explicitly inside
/// the parent's delete transaction, and FK enforcement backstops that.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    first_name    TEXT,
    last_name     TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vehicles (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    nickname   TEXT,
    vin        TEXT,
    year       INTEGER,
    make       TEXT,
    model      TEXT,
    trim       TEXT,
    engine     TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_vehicles_user_id ON vehicles(user_id);

CREATE TABLE IF NOT EXISTS service_records (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id   INTEGER NOT NULL REFERENCES vehicles(id),
    title        TEXT NOT NULL,
    category     TEXT,
    service_date TEXT NOT NULL,
    mileage      INTEGER,
    cost         REAL,
    notes        TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_service_records_vehicle_id ON service_records(vehicle_id);

CREATE TABLE IF NOT EXISTS reminders (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id   INTEGER NOT NULL REFERENCES vehicles(id),
    title        TEXT NOT NULL,
    due_date     TEXT,
    due_mileage  INTEGER,
    is_completed INTEGER NOT NULL DEFAULT 0,
    notes        TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_reminders_vehicle_id ON reminders(vehicle_id);
"#;

/// Create a new connection pool from the given `database_url`
/// (e.g. `sqlite:servicetrack.db`). The file is created if missing.
///
/// `max_connections` controls the pool ceiling.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, DbError> {
    info!("Connecting to database (max_connections={})", max_connections);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Open an in-memory database with the schema applied. Used by tests.
///
/// Capped at one connection: every SQLite `:memory:` connection is its own
/// database, so a larger pool would hand out empty databases.
pub async fn open_in_memory() -> Result<DbPool, DbError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Apply the embedded schema. Idempotent.
pub async fn init_schema(pool: &DbPool) -> Result<(), DbError> {
    info!("Applying database schema");
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
