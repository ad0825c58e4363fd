//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::models::{Environment, GeneratedTest, PromptRecord, TestFile, TestResult, TestSuite};

/// Wrapper type for displaying the result of create operations.
///
/// Prints a banner naming the resource type and ID followed by the full
/// resource.
///
/// # Examples
///
/// ```rust
/// use sentinel_core::{
///     display::CreateResult,
///     models::{Environment, EnvironmentConfig},
/// };
/// use jiff::Timestamp;
///
/// let env = Environment {
///     id: 2,
///     name: "staging".to_string(),
///     config: EnvironmentConfig::for_base_url("https://staging.example.test"),
///     created_at: Timestamp::now(),
/// };
///
/// let output = CreateResult::new(env).to_string();
/// assert!(output.starts_with("Created environment with ID: 2"));
/// assert!(output.contains("BASE_URL: https://staging.example.test"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    /// Create a new CreateResult wrapper.
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<PromptRecord> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created prompt with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Environment> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created environment with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<TestSuite> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created suite with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<TestFile> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Registered file with ID: {} in suite {}",
            self.resource.id, self.resource.suite_id
        )?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<GeneratedTest> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Generated test with ID: {}",
            self.resource.reference.test_id
        )?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<TestResult> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Started result with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations.
///
/// Lists the changes made, if any, before the updated resource.
///
/// # Examples
///
/// ```rust
/// use sentinel_core::{
///     display::UpdateResult,
///     models::{PromptMetadata, PromptRecord, PromptStatus},
/// };
/// use jiff::Timestamp;
///
/// let prompt = PromptRecord {
///     id: 1,
///     title: "Login".to_string(),
///     prompt_content: "Log in and see the dashboard".to_string(),
///     test_type: None,
///     status: PromptStatus::Draft,
///     base_url: None,
///     environment_id: None,
///     model: None,
///     tags: vec![],
///     additional_context: None,
///     metadata: PromptMetadata::default(),
///     generated_tests: vec![],
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
///
/// let result = UpdateResult::with_changes(prompt, vec!["Updated title".to_string()]);
/// assert!(result.to_string().contains("Changes made:\n- Updated title"));
/// ```
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    /// Create a new UpdateResult wrapper.
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    /// Create an UpdateResult with a list of changes made.
    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }

    fn fmt_changes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for UpdateResult<PromptRecord> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated prompt with ID: {}", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<TestResult> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Finished result with ID: {}", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}
