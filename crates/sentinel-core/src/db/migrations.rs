//! Database schema initialization.

use crate::error::{DatabaseResultExt, Result};

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    ///
    /// Every statement in the schema is `IF NOT EXISTS`, so reopening an
    /// existing database leaves its tables and rows untouched.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Enable foreign keys for this connection
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::db::Database;

    #[test]
    fn test_reopening_keeps_existing_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("schema.db");

        let mut db = Database::new(&db_path).unwrap();
        let suite = db.create_suite("smoke", None).unwrap();
        drop(db);

        let reopened = Database::new(&db_path).unwrap();
        let columns: i64 = reopened
            .connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('execution_history') WHERE name = 'other'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(columns, 1);
        assert!(reopened.get_suite(suite.id).unwrap().is_some());
    }
}
