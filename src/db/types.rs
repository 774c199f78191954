//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// A row from the `organizations` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbOrganization {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `people` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbPerson {
    pub id: String,
    pub workspace_id: String,
    pub full_name: String,
    pub primary_email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub headline: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `affiliations` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbAffiliation {
    pub id: String,
    pub workspace_id: String,
    pub person_id: String,
    pub organization_id: String,
    pub role_title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_primary: bool,
    pub created_at: String,
}

/// A row from the `interactions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInteraction {
    pub id: String,
    pub workspace_id: String,
    pub occurred_at: String,
    /// "meeting" | "call" | "email" | "conference" | "note"
    pub interaction_type: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub raw_text: Option<String>,
    /// "manual" | "import" | "integration"
    pub source: String,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
