use rusqlite::params;

use super::*;

impl WorkspaceDb {
    // =========================================================================
    // People
    // =========================================================================

    /// Insert a new person record.
    pub fn insert_person(&self, person: &DbPerson) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO people (
                id, workspace_id, full_name, primary_email, phone, title,
                headline, notes, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                person.id,
                person.workspace_id,
                person.full_name,
                person.primary_email,
                person.phone,
                person.title,
                person.headline,
                person.notes,
                person.created_at,
                person.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Look up a person by id.
    pub fn get_person(&self, id: &str) -> Result<Option<DbPerson>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, full_name, primary_email, phone, title,
                    headline, notes, created_at, updated_at
             FROM people WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_person_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// List all people in a workspace, ordered by name.
    pub fn list_people(&self, workspace_id: &str) -> Result<Vec<DbPerson>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, full_name, primary_email, phone, title,
                    headline, notes, created_at, updated_at
             FROM people WHERE workspace_id = ?1 ORDER BY full_name",
        )?;
        let rows = stmt.query_map(params![workspace_id], Self::map_person_row)?;
        let mut people = Vec::new();
        for row in rows {
            people.push(row?);
        }
        Ok(people)
    }

    /// Update a person's title, bumping `updated_at`.
    pub fn update_person_title(&self, id: &str, title: &str) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE people SET title = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, title, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn map_person_row(row: &rusqlite::Row) -> rusqlite::Result<DbPerson> {
        Ok(DbPerson {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            full_name: row.get(2)?,
            primary_email: row.get(3)?,
            phone: row.get(4)?,
            title: row.get(5)?,
            headline: row.get(6)?,
            notes: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}
