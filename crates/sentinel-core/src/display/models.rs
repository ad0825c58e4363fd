//! Display implementations for domain models.
//!
//! Kept apart from the model definitions so the models stay plain data. All
//! output is markdown.

use std::fmt;

use super::datetime::{Elapsed, LocalDateTime};
use crate::models::{
    Environment, ExecutionHistoryEntry, FileStatus, GeneratedTest, GeneratedTestRef,
    PromptRecord, PromptStatus, ResultStatus, RunStatus, StepAction, StepModel, TestFile,
    TestResult, TestSuite, TestType,
};

impl fmt::Display for PromptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line: `` action `target` = value (expect: assertion) ``.
impl fmt::Display for StepModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)?;
        if !self.target.is_empty() {
            write!(f, " `{}`", self.target)?;
        }
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        if let Some(assertion) = &self.assertion {
            write!(f, " (expect: {assertion})")?;
        }
        Ok(())
    }
}

impl fmt::Display for PromptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.title)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        if let Some(test_type) = self.test_type {
            writeln!(f, "- Type: {test_type}")?;
        }
        if let Some(url) = &self.base_url {
            writeln!(f, "- Base URL: {url}")?;
        }
        if let Some(env) = self.environment_id {
            writeln!(f, "- Environment: {env}")?;
        }
        if let Some(model) = &self.model {
            writeln!(f, "- Model: {model}")?;
        }
        if !self.tags.is_empty() {
            writeln!(f, "- Tags: {}", self.tags.join(", "))?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        writeln!(f)?;
        writeln!(f, "{}", self.prompt_content)?;

        if let Some(context) = &self.additional_context {
            writeln!(f, "\n## Context")?;
            writeln!(f)?;
            writeln!(f, "{context}")?;
        }

        if !self.metadata.parsed_steps.is_empty() {
            writeln!(f, "\n## Parsed Steps")?;
            writeln!(f)?;
            for (index, step) in self.metadata.parsed_steps.iter().enumerate() {
                writeln!(f, "{}. {step}", index + 1)?;
            }
        }

        if !self.generated_tests.is_empty() {
            writeln!(f, "\n## Generated Tests")?;
            writeln!(f)?;
            for test in &self.generated_tests {
                write!(f, "{test}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for GeneratedTestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- **{}** (ID: {}): `{}`",
            self.test_name, self.test_id, self.file_path
        )?;
        writeln!(f, "  - Fingerprint: {}", self.fingerprint)?;
        writeln!(f, "  - Created: {}", LocalDateTime(&self.created_at))
    }
}

impl fmt::Display for GeneratedTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = &self.reference;
        writeln!(f, "# {} (ID: {})", reference.test_name, reference.test_id)?;
        writeln!(f)?;
        writeln!(f, "- Prompt: {}", reference.prompt_id)?;
        writeln!(f, "- Sequence: {}", reference.sequence)?;
        writeln!(f, "- File: {}", reference.file_path)?;
        if let Some(env) = reference.environment_id {
            writeln!(f, "- Environment: {env}")?;
        }
        writeln!(f, "- Fingerprint: {}", reference.fingerprint)?;
        writeln!(f, "- Created: {}", LocalDateTime(&reference.created_at))?;
        writeln!(f)?;
        writeln!(f, "```typescript")?;
        write!(f, "{}", self.source_text)?;
        if !self.source_text.ends_with('\n') {
            writeln!(f)?;
        }
        writeln!(f, "```")
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.name, self.id)?;
        writeln!(f)?;
        let config = &self.config;
        writeln!(
            f,
            "- BASE_URL: {}",
            config.base_url().unwrap_or("(not set)")
        )?;
        writeln!(f, "- BROWSER: {}", config.browser)?;
        writeln!(f, "- TIMEOUT: {}ms", config.timeout_ms)?;
        writeln!(f, "- RETRIES: {}", config.retries)?;
        writeln!(f, "- HEADLESS: {}", config.headless)?;
        for (key, value) in &config.variables {
            writeln!(f, "- {key}: {value}")?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for TestFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- `{}` ({} tests): {}",
            self.file_path, self.test_count, self.status
        )?;
        if let Some(last_run) = &self.last_run {
            write!(f, ", last run {}", LocalDateTime(last_run))?;
        }
        writeln!(f)
    }
}

impl fmt::Display for ExecutionHistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### Run {} ({})", self.run_id, self.status)?;
        writeln!(f)?;
        writeln!(
            f,
            "- Tests: {} total, {} passed, {} failed, {} skipped, {} other",
            self.total_tests, self.passed, self.failed, self.skipped, self.other
        )?;
        writeln!(f, "- Started: {}", LocalDateTime(&self.start_time))?;
        writeln!(f, "- Duration: {}", Elapsed(self.duration_ms))?;
        if let Some(report) = &self.report_path {
            writeln!(f, "- Report: {report}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if self.test_files.is_empty() {
            writeln!(f, "\nNo files in this suite.")?;
        } else {
            writeln!(f, "\n## Files")?;
            writeln!(f)?;
            for file in &self.test_files {
                write!(f, "{file}")?;
            }
        }

        if !self.execution_history.is_empty() {
            writeln!(f, "\n## History")?;
            writeln!(f)?;
            for entry in &self.execution_history {
                write!(f, "{entry}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.id,
            self.test_id,
            self.status.with_icon()
        )?;
        writeln!(f)?;
        writeln!(f, "- Run: {}", self.run_id)?;
        writeln!(f, "- File: {}", self.file_path)?;
        writeln!(f, "- Environment: {}", self.environment_id)?;
        writeln!(f, "- Started: {}", LocalDateTime(&self.start_time))?;
        if let Some(end) = &self.end_time {
            writeln!(f, "- Finished: {}", LocalDateTime(end))?;
        }
        if let Some(duration) = self.duration_ms {
            writeln!(f, "- Duration: {}", Elapsed(duration))?;
        }
        if let Some(error) = &self.error_message {
            writeln!(f, "- Error: {error}")?;
        }

        if !self.steps.is_empty() {
            writeln!(f)?;
            for step in &self.steps {
                write!(f, "{}. {} {}", step.index + 1, step.status.with_icon(), step.action)?;
                if !step.target.is_empty() {
                    write!(f, " `{}`", step.target)?;
                }
                if let Some(error) = &step.error {
                    write!(f, ": {error}")?;
                }
                writeln!(f)?;
            }
        }

        let screenshots: Vec<&str> = self.screenshots().collect();
        if !screenshots.is_empty() {
            writeln!(f)?;
            writeln!(f, "Screenshots:")?;
            for path in screenshots {
                writeln!(f, "- {path}")?;
            }
        }

        writeln!(f)
    }
}
