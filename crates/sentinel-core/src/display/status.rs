//! Confirmation messages for prompt lifecycle transitions.

use std::fmt;

use crate::models::{PromptRecord, PromptStatus};

/// Confirmation of a prompt moving between lifecycle states.
pub struct OperationStatus {
    pub prompt_id: u64,
    pub title: String,
    pub from: PromptStatus,
    pub to: PromptStatus,
    pub success: bool,
}

impl OperationStatus {
    /// Confirms that `prompt` reached its current status from `from`.
    pub fn prompt_transition(prompt: &PromptRecord, from: PromptStatus) -> Self {
        Self {
            prompt_id: prompt.id,
            title: prompt.title.clone(),
            from,
            to: prompt.status,
            success: true,
        }
    }

    /// What the new state allows next.
    fn follow_up(&self) -> Option<&'static str> {
        match self.to {
            PromptStatus::Draft => None,
            PromptStatus::Active => Some("Ready for parsing and test generation."),
            PromptStatus::Archived => Some("No further parsing or generation is possible."),
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.success { "Success:" } else { "Error:" };
        writeln!(
            f,
            "{label} Prompt {} '{}' is now {} (was {})",
            self.prompt_id, self.title, self.to, self.from
        )?;
        if let Some(next) = self.follow_up() {
            writeln!(f, "{next}")?;
        }
        Ok(())
    }
}
