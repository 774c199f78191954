use rusqlite::params;

use super::*;

impl WorkspaceDb {
    // =========================================================================
    // Organizations
    // =========================================================================

    /// Insert a new organization record.
    pub fn insert_organization(&self, org: &DbOrganization) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO organizations (
                id, workspace_id, name, domain, industry, notes, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                org.id,
                org.workspace_id,
                org.name,
                org.domain,
                org.industry,
                org.notes,
                org.created_at,
                org.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Look up an organization by id.
    pub fn get_organization(&self, id: &str) -> Result<Option<DbOrganization>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, name, domain, industry, notes, created_at, updated_at
             FROM organizations WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_organization_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// List all organizations in a workspace, ordered by name.
    pub fn list_organizations(&self, workspace_id: &str) -> Result<Vec<DbOrganization>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, name, domain, industry, notes, created_at, updated_at
             FROM organizations WHERE workspace_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![workspace_id], Self::map_organization_row)?;
        let mut orgs = Vec::new();
        for row in rows {
            orgs.push(row?);
        }
        Ok(orgs)
    }

    fn map_organization_row(row: &rusqlite::Row) -> rusqlite::Result<DbOrganization> {
        Ok(DbOrganization {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            name: row.get(2)?,
            domain: row.get(3)?,
            industry: row.get(4)?,
            notes: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}
