use rusqlite::params;

use super::*;

impl WorkspaceDb {
    // =========================================================================
    // Interactions
    // =========================================================================

    /// Insert a new interaction record.
    pub fn insert_interaction(&self, interaction: &DbInteraction) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO interactions (
                id, workspace_id, occurred_at, interaction_type, title,
                summary, raw_text, source, created_by, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                interaction.id,
                interaction.workspace_id,
                interaction.occurred_at,
                interaction.interaction_type,
                interaction.title,
                interaction.summary,
                interaction.raw_text,
                interaction.source,
                interaction.created_by,
                interaction.created_at,
                interaction.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Look up an interaction by id.
    pub fn get_interaction(&self, id: &str) -> Result<Option<DbInteraction>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, occurred_at, interaction_type, title,
                    summary, raw_text, source, created_by, created_at, updated_at
             FROM interactions WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok(DbInteraction {
                id: row.get(0)?,
                workspace_id: row.get(1)?,
                occurred_at: row.get(2)?,
                interaction_type: row.get(3)?,
                title: row.get(4)?,
                summary: row.get(5)?,
                raw_text: row.get(6)?,
                source: row.get(7)?,
                created_by: row.get(8)?,
                created_at: row.get(9)?,
                updated_at: row.get(10)?,
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Link a participant to an interaction. Re-linking the same person
    /// is a no-op (INSERT OR IGNORE).
    pub fn add_interaction_participant(
        &self,
        interaction_id: &str,
        person_id: &str,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO interaction_participants (interaction_id, person_id)
             VALUES (?1, ?2)",
            params![interaction_id, person_id],
        )?;
        Ok(())
    }

    /// List participant person ids for an interaction.
    pub fn list_interaction_participants(
        &self,
        interaction_id: &str,
    ) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT person_id FROM interaction_participants
             WHERE interaction_id = ?1 ORDER BY person_id",
        )?;
        let rows = stmt.query_map(params![interaction_id], |row| row.get(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}
