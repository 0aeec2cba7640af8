//! Database configuration module.
//!
//! Handles `SQLite` connection setup and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the stored column names always match the row entities.

use crate::core::{reconcile::RowGroup, store};
use crate::entities::{MetricRow, ReviewRow, SettingRow, TacticRow, VisionRow};
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Statement};
use tracing::{info, warn};

/// Database used when `DATABASE_URL` is unset. `mode=rwc` creates the file.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/twelve_week.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Operator hint for a failed connection, keyed on the driver's message.
#[must_use]
pub fn connection_hint(message: &str) -> &'static str {
    let message = message.to_ascii_lowercase();
    if message.contains("unable to open database file") || message.contains("code: 14") {
        "Check that the directory in DATABASE_URL exists and add ?mode=rwc to create the file"
    } else if message.contains("readonly")
        || message.contains("read-only")
        || message.contains("permission denied")
    {
        "The database file is not writable by this user; check its permissions"
    } else if message.contains("not a database") || message.contains("code: 26") {
        "DATABASE_URL points at a file that is not a SQLite database"
    } else {
        "Check DATABASE_URL, e.g. sqlite://data/twelve_week.sqlite?mode=rwc"
    }
}

/// Connects to `database_url`, attaching an operator hint on failure.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(|e| {
        let message = e.to_string();
        Error::Connection {
            hint: connection_hint(&message),
            message,
        }
    })
}

/// Establishes a connection using `DATABASE_URL` (or the default database).
///
/// For a file-backed database the parent directory is created first.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }
    info!("Connecting to {database_url}");
    connect(&database_url).await
}

fn sqlite_parent_dir(database_url: &str) -> Option<&str> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    path.rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
}

/// Creates the five row tables if they do not exist yet, and adds any column an
/// older table is missing.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, TacticRow).await?;
    create_table(db, &schema, MetricRow).await?;
    create_table(db, &schema, ReviewRow).await?;
    create_table(db, &schema, VisionRow).await?;
    create_table(db, &schema, SettingRow).await?;

    for group in RowGroup::ALL {
        add_missing_columns(db, group).await?;
    }
    Ok(())
}

async fn add_missing_columns(db: &DatabaseConnection, group: RowGroup) -> Result<()> {
    let table = group.table_name();
    let present = store::table_columns(db, table).await?;

    for column in store::missing_columns(group, &present) {
        warn!(table, column, "Adding missing column");
        db.execute(Statement::from_string(
            db.get_database_backend(),
            format!("ALTER TABLE \"{table}\" ADD COLUMN \"{column}\" TEXT"),
        ))
        .await?;
    }
    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}
