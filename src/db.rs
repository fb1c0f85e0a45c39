//! Connection handle and migration runner.
//!
//! One synchronous connection for the whole interactive session, owned by an
//! explicit `Database` value that gets passed down to the menu (no process-wide
//! singleton). The connection is established on first use and can be closed and
//! re-opened; `close()` is idempotent.

use anyhow::{Context, Result as AnyResult};
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use tracing::info;

use crate::error::Result;

pub struct Database {
    url: String,
    conn: Option<PgConnection>,
}

impl Database {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            conn: None,
        }
    }

    /// Return the shared connection, establishing it on first use.
    pub fn conn(&mut self) -> Result<&mut PgConnection> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                info!("Connecting to the database...");
                PgConnection::establish(&self.url)?
            }
        };
        Ok(self.conn.insert(conn))
    }

    /// Drop the cached connection. Safe to call when none is open.
    pub fn close(&mut self) {
        if self.conn.take().is_some() {
            info!("Database connection closed");
        }
    }
}

/// Apply pending embedded migrations, returning how many ran.
pub fn run_migrations(
    conn: &mut PgConnection,
    migrations: EmbeddedMigrations,
) -> AnyResult<usize> {
    let versions = conn
        .run_pending_migrations(migrations)
        .map_err(|err| anyhow::anyhow!(err))
        .context("Failed to run migrations")?;
    Ok(versions.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_idempotent_without_a_connection() {
        let mut db = Database::new("postgres://localhost/unused");
        db.close();
        db.close();
    }

    #[test]
    fn conn_fails_on_an_invalid_url() {
        let mut db = Database::new("definitely not a connection string");
        assert!(db.conn().is_err());
    }
}
