use rusqlite::params;

use super::*;

impl WorkspaceDb {
    // =========================================================================
    // Affiliations
    // =========================================================================

    /// Insert a new affiliation edge.
    ///
    /// Uniqueness of the `(person_id, organization_id)` pair is the
    /// caller's responsibility — check with [`Self::affiliation_exists`]
    /// first.
    pub fn insert_affiliation(&self, affiliation: &DbAffiliation) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO affiliations (
                id, workspace_id, person_id, organization_id, role_title,
                start_date, end_date, is_primary, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                affiliation.id,
                affiliation.workspace_id,
                affiliation.person_id,
                affiliation.organization_id,
                affiliation.role_title,
                affiliation.start_date,
                affiliation.end_date,
                affiliation.is_primary as i32,
                affiliation.created_at,
            ],
        )?;
        Ok(())
    }

    /// Check whether any affiliation exists for a (person, organization) pair.
    pub fn affiliation_exists(
        &self,
        person_id: &str,
        organization_id: &str,
    ) -> Result<bool, DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM affiliations WHERE person_id = ?1 AND organization_id = ?2
             )",
            params![person_id, organization_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// List a person's affiliations, most recent first.
    pub fn list_affiliations_for_person(
        &self,
        person_id: &str,
    ) -> Result<Vec<DbAffiliation>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, person_id, organization_id, role_title,
                    start_date, end_date, is_primary, created_at
             FROM affiliations WHERE person_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![person_id], |row| {
            Ok(DbAffiliation {
                id: row.get(0)?,
                workspace_id: row.get(1)?,
                person_id: row.get(2)?,
                organization_id: row.get(3)?,
                role_title: row.get(4)?,
                start_date: row.get(5)?,
                end_date: row.get(6)?,
                is_primary: row.get::<_, i32>(7)? != 0,
                created_at: row.get(8)?,
            })
        })?;
        let mut affiliations = Vec::new();
        for row in rows {
            affiliations.push(row?);
        }
        Ok(affiliations)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::open_test_db;
    use super::*;

    fn seed_pair(db: &WorkspaceDb) {
        db.insert_person(&DbPerson {
            id: "p1".to_string(),
            workspace_id: "ws1".to_string(),
            full_name: "Alice Chen".to_string(),
            primary_email: None,
            phone: None,
            title: None,
            headline: None,
            notes: None,
            created_at: "2026-08-01T00:00:00Z".to_string(),
            updated_at: "2026-08-01T00:00:00Z".to_string(),
        })
        .unwrap();
        db.insert_organization(&DbOrganization {
            id: "o1".to_string(),
            workspace_id: "ws1".to_string(),
            name: "Acme Corp".to_string(),
            domain: None,
            industry: None,
            notes: None,
            created_at: "2026-08-01T00:00:00Z".to_string(),
            updated_at: "2026-08-01T00:00:00Z".to_string(),
        })
        .unwrap();
    }

    fn affiliation(id: &str) -> DbAffiliation {
        DbAffiliation {
            id: id.to_string(),
            workspace_id: "ws1".to_string(),
            person_id: "p1".to_string(),
            organization_id: "o1".to_string(),
            role_title: Some("VP Engineering".to_string()),
            start_date: None,
            end_date: None,
            is_primary: true,
            created_at: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_exists_reflects_insert() {
        let (_dir, db) = open_test_db();
        seed_pair(&db);

        assert!(!db.affiliation_exists("p1", "o1").unwrap());
        db.insert_affiliation(&affiliation("a1")).unwrap();
        assert!(db.affiliation_exists("p1", "o1").unwrap());
        assert!(!db.affiliation_exists("p1", "other").unwrap());
    }

    #[test]
    fn test_list_for_person() {
        let (_dir, db) = open_test_db();
        seed_pair(&db);
        db.insert_affiliation(&affiliation("a1")).unwrap();

        let affiliations = db.list_affiliations_for_person("p1").unwrap();
        assert_eq!(affiliations.len(), 1);
        assert_eq!(affiliations[0].organization_id, "o1");
        assert!(affiliations[0].is_primary);
        assert_eq!(affiliations[0].role_title.as_deref(), Some("VP Engineering"));
    }
}
