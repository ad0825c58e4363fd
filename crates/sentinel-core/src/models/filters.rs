//! Filter types for querying prompts.

use super::{PromptStatus, TestType};

/// Filter options for querying prompts.
#[derive(Debug, Clone, Default)]
pub struct PromptFilter {
    /// Filter by lifecycle state; `None` lists every state
    pub status: Option<PromptStatus>,

    /// Filter by test type
    pub test_type: Option<TestType>,

    /// Only prompts carrying this tag
    pub tag: Option<String>,
}

impl From<&crate::params::ListPrompts> for PromptFilter {
    /// Convert ListPrompts parameters to a PromptFilter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sentinel_core::{models::{PromptFilter, PromptStatus}, params::ListPrompts};
    ///
    /// let params = ListPrompts {
    ///     status: Some(PromptStatus::Active),
    ///     test_type: None,
    ///     tag: None,
    /// };
    /// let filter: PromptFilter = (&params).into();
    /// assert_eq!(filter.status, Some(PromptStatus::Active));
    /// ```
    fn from(params: &crate::params::ListPrompts) -> Self {
        Self {
            status: params.status,
            test_type: params.test_type,
            tag: params.tag.clone(),
        }
    }
}
