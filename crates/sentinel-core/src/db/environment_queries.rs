//! Environment storage. Environments are read-only to the pipeline once
//! created.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension};

use super::utils::{id_column, json_column, timestamp_column};
use crate::{
    error::{DatabaseResultExt, PipelineError, Result},
    models::{Environment, EnvironmentConfig},
};

const INSERT_ENVIRONMENT_SQL: &str =
    "INSERT INTO environments (name, config, created_at) VALUES (?1, ?2, ?3)";
const SELECT_ENVIRONMENT_SQL: &str =
    "SELECT id, name, config, created_at FROM environments WHERE id = ?1";
const SELECT_ENVIRONMENTS_SQL: &str =
    "SELECT id, name, config, created_at FROM environments ORDER BY id";
const CHECK_ENVIRONMENT_NAME_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM environments WHERE name = ?1)";

impl super::Database {
    fn build_environment_from_row(row: &rusqlite::Row) -> rusqlite::Result<Environment> {
        Ok(Environment {
            id: id_column(row, 0)?,
            name: row.get(1)?,
            config: json_column::<EnvironmentConfig>(row, 2)?,
            created_at: timestamp_column(row, 3)?,
        })
    }

    /// Stores a new named environment.
    pub fn create_environment(
        &mut self,
        name: &str,
        config: &EnvironmentConfig,
    ) -> Result<Environment> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PipelineError::invalid_input("name").with_reason("must not be empty"));
        }

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_ENVIRONMENT_NAME_SQL, params![name], |row| row.get(0))
            .db_context("Failed to check environment name")?;
        if exists {
            return Err(PipelineError::invalid_input("name")
                .with_reason(format!("an environment named '{name}' already exists")));
        }

        let now = Timestamp::now();
        let config_json = serde_json::to_string(config)?;

        tx.execute(
            INSERT_ENVIRONMENT_SQL,
            params![name, config_json, now.to_string()],
        )
        .db_context("Failed to insert environment")?;

        let id = tx.last_insert_rowid() as u64;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Environment {
            id,
            name: name.to_string(),
            config: config.clone(),
            created_at: now,
        })
    }

    /// Retrieves an environment by its ID.
    pub fn get_environment(&self, id: u64) -> Result<Option<Environment>> {
        self.connection
            .query_row(
                SELECT_ENVIRONMENT_SQL,
                params![id as i64],
                Self::build_environment_from_row,
            )
            .optional()
            .db_context("Failed to query environment")
    }

    /// Lists all environments in creation order.
    pub fn list_environments(&self) -> Result<Vec<Environment>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_ENVIRONMENTS_SQL)
            .db_context("Failed to prepare query")?;

        let environments = stmt
            .query_map([], Self::build_environment_from_row)
            .db_context("Failed to query environments")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to collect environments")?;

        Ok(environments)
    }
}
