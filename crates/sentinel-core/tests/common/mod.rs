use std::sync::Arc;

use sentinel_core::{Pipeline, PipelineBuilder, StaticInference};
use tempfile::TempDir;

/// Helper function to create a test pipeline whose inference always answers
/// with `payload`
pub async fn create_test_pipeline(payload: &str) -> (TempDir, Pipeline) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let pipeline = PipelineBuilder::new()
        .with_database_path(Some(&db_path))
        .with_inference(Arc::new(StaticInference::new(payload)))
        .build()
        .await
        .expect("Failed to create pipeline");
    (temp_dir, pipeline)
}
