//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper formats its items with their own Display implementation and
//! prints a fixed message when the collection is empty.

use std::{fmt, ops::Index};

use super::datetime::LocalDateTime;
use crate::models::{
    Environment, ExecutionHistoryEntry, PromptRecord, StepModel, TestResult, TestSuite,
};

/// Accessors and iteration shared by every collection wrapper.
macro_rules! collection {
    ($wrapper:ident, $item:ty) => {
        impl $wrapper {
            /// Check if the collection is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Number of items in the collection.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Item at the given index.
            pub fn get(&self, index: usize) -> Option<&$item> {
                self.0.get(index)
            }

            /// Iterator over the items.
            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $wrapper {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $wrapper {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<Self::Item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $wrapper {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

/// Prompts listed one summary block each.
pub struct Prompts(pub Vec<PromptRecord>);

collection!(Prompts, PromptRecord);

impl fmt::Display for Prompts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No prompts found.");
        }
        for prompt in &self.0 {
            let generated = if prompt.generated_tests.is_empty() {
                String::new()
            } else {
                format!(" ({} generated)", prompt.generated_tests.len())
            };
            writeln!(f, "## {} (ID: {}){generated}", prompt.title, prompt.id)?;
            writeln!(f)?;
            writeln!(f, "- **Status**: {}", prompt.status)?;
            if let Some(test_type) = prompt.test_type {
                writeln!(f, "- **Type**: {test_type}")?;
            }
            if !prompt.tags.is_empty() {
                writeln!(f, "- **Tags**: {}", prompt.tags.join(", "))?;
            }
            writeln!(f, "- **Created**: {}", LocalDateTime(&prompt.created_at))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parsed step sequence, numbered from 1.
pub struct Steps(pub Vec<StepModel>);

collection!(Steps, StepModel);

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No steps found.");
        }
        for (index, step) in self.0.iter().enumerate() {
            writeln!(f, "{}. {step}", index + 1)?;
        }
        Ok(())
    }
}

/// Stored environments.
pub struct Environments(pub Vec<Environment>);

collection!(Environments, Environment);

impl fmt::Display for Environments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No environments found.");
        }
        for env in &self.0 {
            write!(f, "{env}")?;
        }
        Ok(())
    }
}

/// Suites listed one line each with their file and run counts.
pub struct Suites(pub Vec<TestSuite>);

collection!(Suites, TestSuite);

impl fmt::Display for Suites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No suites found.");
        }
        for suite in &self.0 {
            write!(
                f,
                "- **{}** (ID: {}): {} files, {} runs",
                suite.name,
                suite.id,
                suite.test_files.len(),
                suite.execution_history.len()
            )?;
            if let Some(last) = suite.latest_run() {
                write!(f, ", last {}", last.status)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Test results.
pub struct TestResults(pub Vec<TestResult>);

collection!(TestResults, TestResult);

impl fmt::Display for TestResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No results found.");
        }
        for result in &self.0 {
            write!(f, "{result}")?;
        }
        Ok(())
    }
}

/// A suite's recorded runs in recording order.
pub struct RunHistory(pub Vec<ExecutionHistoryEntry>);

collection!(RunHistory, ExecutionHistoryEntry);

impl fmt::Display for RunHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No runs recorded.");
        }
        for entry in &self.0 {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
