//! SQLite-backed persistence for workspace rosters, affiliations, and
//! interactions.
//!
//! The database lives at `~/.tapestry/tapestry.db` by default and is the
//! working store the commit applier writes into. Every row is scoped by
//! `workspace_id`; rosters are always read per workspace.

use std::path::PathBuf;

use rusqlite::Connection;

pub mod types;
pub use types::*;

mod affiliations;
mod interactions;
mod organizations;
mod people;

pub struct WorkspaceDb {
    conn: Connection,
}

impl WorkspaceDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at the default path and apply the
    /// schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Useful for testing.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }

    fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".tapestry").join("tapestry.db"))
    }
}
