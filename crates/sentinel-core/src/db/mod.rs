//! Database operations and SQLite management.
//!
//! This module provides the persistence boundary of the pipeline: SQLite
//! connection handling, schema management, and one query module per entity.
//! Every append-only invariant is enforced twice, by the code paths here and
//! by triggers in the embedded schema.

use std::{path::Path, time::Duration};

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod environment_queries;
pub mod migrations;
pub mod prompt_queries;
pub mod result_queries;
pub mod suite_queries;
pub mod utils;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Runs `f` inside an IMMEDIATE transaction.
    ///
    /// The write lock is held from the first read in `f` until the commit.
    /// An error from `f` rolls back everything it wrote.
    pub fn immediate<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.connection
            .execute_batch("BEGIN IMMEDIATE")
            .db_context("Failed to begin transaction")?;

        let outcome = f(self).and_then(|value| {
            self.connection
                .execute_batch("COMMIT")
                .db_context("Failed to commit transaction")?;
            Ok(value)
        });
        if outcome.is_err() && !self.connection.is_autocommit() {
            if let Err(e) = self.connection.execute_batch("ROLLBACK") {
                log::warn!("Failed to roll back transaction: {e}");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::Database;
    use crate::{error::PipelineError, models::PromptStatus, params::CreatePrompt};

    #[test]
    fn test_immediate_rolls_back_on_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = Database::new(temp_dir.path().join("tx.db")).unwrap();
        let prompt = db
            .create_prompt(&CreatePrompt {
                title: "Rollback".to_string(),
                ..Default::default()
            })
            .unwrap();

        let err = db
            .immediate(|db| {
                db.transition_prompt(prompt.id, PromptStatus::Draft, PromptStatus::Active)?;
                Err::<(), _>(PipelineError::invalid_input("test").with_reason("abort"))
            })
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
        assert!(db.connection.is_autocommit());
        assert_eq!(
            db.get_prompt_status(prompt.id).unwrap(),
            Some(PromptStatus::Draft)
        );

        let status = db
            .immediate(|db| {
                db.transition_prompt(prompt.id, PromptStatus::Draft, PromptStatus::Active)?;
                db.get_prompt_status(prompt.id)
            })
            .unwrap();
        assert_eq!(status, Some(PromptStatus::Active));
    }
}
