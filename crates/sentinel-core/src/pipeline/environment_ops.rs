//! Environment operations for the Pipeline.

use log::info;

use super::Pipeline;
use crate::{
    error::Result,
    models::Environment,
    params::{CreateEnvironment, Id},
};

impl Pipeline {
    /// Stores a named environment configuration.
    pub async fn create_environment(&self, params: &CreateEnvironment) -> Result<Environment> {
        let params = params.clone();
        let env = self
            .with_db(move |db| db.create_environment(&params.name, &params.config))
            .await?;
        info!("Created environment {} ({})", env.id, env.name);
        Ok(env)
    }

    /// Retrieves an environment by its ID.
    pub async fn get_environment(&self, params: &Id) -> Result<Option<Environment>> {
        let id = params.id;
        self.with_db(move |db| db.get_environment(id)).await
    }

    /// Lists all environments.
    pub async fn list_environments(&self) -> Result<Vec<Environment>> {
        self.with_db(|db| db.list_environments()).await
    }
}
