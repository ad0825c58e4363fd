//! Data models for prompts, steps, suites, results and environments.
//!
//! This module contains the domain records the pipeline reads and writes.
//! Display implementations for these models are located in
//! [`crate::display::models`] to keep data structures separate from
//! presentation.
//!
//! Records are explicit, validated structs: a [`StepModel`] can only be
//! built through [`StepModel::new`] or `TryFrom<CandidateStep>`, both of which
//! run [`StepModel::validate`].
//!
//! # Examples
//!
//! ```rust
//! use sentinel_core::models::{StepAction, StepModel};
//!
//! let step = StepModel::new(
//!     StepAction::AssertText,
//!     "h1",
//!     None,
//!     Some("Welcome".to_string()),
//! )
//! .expect("valid step");
//! assert!(step.action.is_assertion());
//!
//! // Assert-class steps need an assertion
//! assert!(StepModel::new(StepAction::AssertText, "h1", None, None).is_err());
//! ```

pub mod artifact;
pub mod environment;
pub mod filters;
pub mod prompt;
pub mod result;
pub mod status;
pub mod step;
pub mod suite;

#[cfg(test)]
mod tests;

// Re-export all public types at the models level
pub use artifact::Artifact;
pub use environment::{Environment, EnvironmentConfig};
pub use filters::PromptFilter;
pub use prompt::{GeneratedTest, GeneratedTestRef, PromptMetadata, PromptRecord};
pub use result::{
    Attachment, AttachmentKind, ExecutionOutcome, ResultHandle, StepResult, TestResult,
};
pub use status::{FileStatus, PromptStatus, ResultStatus, RunStatus, TestType};
pub use step::{CandidateStep, InvalidStep, StepAction, StepModel};
pub use suite::{ExecutionHistoryEntry, TestFile, TestSuite};
