//! Step model definition and validation.
//!
//! A [`StepModel`] is one automation instruction: an action from a fixed
//! vocabulary, the element or URL it addresses, an optional input value and,
//! for assert-class actions, the expected outcome.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recognized automation actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum StepAction {
    Navigate,
    Click,
    DoubleClick,
    Fill,
    Select,
    Hover,
    Press,
    Check,
    Uncheck,
    Wait,
    Screenshot,
    AssertText,
    AssertVisible,
    AssertHidden,
    AssertUrl,
    AssertTitle,
    AssertValue,
}

impl StepAction {
    /// Canonical spelling used in storage, fingerprints and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::Navigate => "navigate",
            StepAction::Click => "click",
            StepAction::DoubleClick => "double-click",
            StepAction::Fill => "fill",
            StepAction::Select => "select",
            StepAction::Hover => "hover",
            StepAction::Press => "press",
            StepAction::Check => "check",
            StepAction::Uncheck => "uncheck",
            StepAction::Wait => "wait",
            StepAction::Screenshot => "screenshot",
            StepAction::AssertText => "assert-text",
            StepAction::AssertVisible => "assert-visible",
            StepAction::AssertHidden => "assert-hidden",
            StepAction::AssertUrl => "assert-url",
            StepAction::AssertTitle => "assert-title",
            StepAction::AssertValue => "assert-value",
        }
    }

    /// Assert-class actions must carry an assertion.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            StepAction::AssertText
                | StepAction::AssertVisible
                | StepAction::AssertHidden
                | StepAction::AssertUrl
                | StepAction::AssertTitle
                | StepAction::AssertValue
        )
    }

    /// Actions that address an element or a URL and need a target.
    pub fn requires_target(&self) -> bool {
        matches!(
            self,
            StepAction::Navigate
                | StepAction::Click
                | StepAction::DoubleClick
                | StepAction::Fill
                | StepAction::Select
                | StepAction::Hover
                | StepAction::Check
                | StepAction::Uncheck
                | StepAction::AssertText
                | StepAction::AssertVisible
                | StepAction::AssertHidden
                | StepAction::AssertValue
        )
    }

    /// Actions driven by an input value.
    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            StepAction::Fill | StepAction::Select | StepAction::Press
        )
    }
}

impl FromStr for StepAction {
    type Err = InvalidStep;

    /// Parses an action, accepting the aliases inference output commonly
    /// uses (`goto`, `type`, `assertText`, `assert_visible`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidStep::EmptyAction);
        }

        let normalized = normalize_action(trimmed);
        let action = match normalized.as_str() {
            "navigate" | "goto" | "go-to" | "open" | "visit" | "navigate-to" => {
                StepAction::Navigate
            }
            "click" | "tap" => StepAction::Click,
            "double-click" | "dblclick" | "dbl-click" => StepAction::DoubleClick,
            "fill" | "type" | "input" | "enter" | "enter-text" => StepAction::Fill,
            "select" | "select-option" => StepAction::Select,
            "hover" => StepAction::Hover,
            "press" | "press-key" | "keypress" => StepAction::Press,
            "check" => StepAction::Check,
            "uncheck" => StepAction::Uncheck,
            "wait" | "wait-for" | "sleep" => StepAction::Wait,
            "screenshot" | "take-screenshot" | "capture" => StepAction::Screenshot,
            "assert-text" | "expect-text" | "verify-text" | "check-text" => {
                StepAction::AssertText
            }
            "assert-visible" | "expect-visible" | "verify-visible" => StepAction::AssertVisible,
            "assert-hidden" | "expect-hidden" | "assert-not-visible" => StepAction::AssertHidden,
            "assert-url" | "expect-url" | "verify-url" => StepAction::AssertUrl,
            "assert-title" | "expect-title" | "verify-title" => StepAction::AssertTitle,
            "assert-value" | "expect-value" | "verify-value" => StepAction::AssertValue,
            _ => {
                return Err(InvalidStep::UnknownAction {
                    action: trimmed.to_string(),
                })
            }
        };
        Ok(action)
    }
}

/// Lowercases an action and folds camelCase, snake_case and spaces into
/// kebab-case.
fn normalize_action(action: &str) -> String {
    let mut out = String::with_capacity(action.len() + 4);
    let mut prev_lower = false;
    for ch in action.chars() {
        if ch == '_' || ch == ' ' || ch == '-' {
            if !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        } else if ch.is_uppercase() {
            if prev_lower && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out.trim_matches('-').to_string()
}

/// Reasons a step fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidStep {
    #[error("step has no action")]
    EmptyAction,
    #[error("unknown action '{action}'")]
    UnknownAction { action: String },
    #[error("action '{action}' requires a non-empty assertion")]
    MissingAssertion { action: StepAction },
    #[error("action '{action}' requires a non-empty target")]
    EmptyTarget { action: StepAction },
    #[error("action '{action}' requires a value")]
    MissingValue { action: StepAction },
}

/// One automation step and its assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepModel {
    /// What to do
    pub action: StepAction,

    /// Locator expression or URL (may be empty for page-level actions)
    #[serde(default)]
    pub target: String,

    /// Input for value-driven actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Expected outcome for assert-class actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<String>,
}

impl StepModel {
    /// Builds a validated step.
    pub fn new(
        action: StepAction,
        target: impl Into<String>,
        value: Option<String>,
        assertion: Option<String>,
    ) -> Result<Self, InvalidStep> {
        let step = Self {
            action,
            target: target.into(),
            value,
            assertion,
        };
        step.validate()?;
        Ok(step)
    }

    /// A `navigate` step to the given URL.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            action: StepAction::Navigate,
            target: url.into(),
            value: None,
            assertion: None,
        }
    }

    /// Checks the step invariants.
    pub fn validate(&self) -> Result<(), InvalidStep> {
        if self.action.requires_target() && self.target.trim().is_empty() {
            return Err(InvalidStep::EmptyTarget {
                action: self.action,
            });
        }
        if self.action.is_assertion()
            && self
                .assertion
                .as_deref()
                .map_or(true, |a| a.trim().is_empty())
        {
            return Err(InvalidStep::MissingAssertion {
                action: self.action,
            });
        }
        if self.action.requires_value() && self.value.is_none() {
            return Err(InvalidStep::MissingValue {
                action: self.action,
            });
        }
        Ok(())
    }

    /// Stable textual encoding used for fingerprinting.
    ///
    /// Fields are separated by the ASCII unit separator and terminated by the
    /// record separator so that no field content can shift a boundary.
    pub fn canonical(&self) -> String {
        format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1e}",
            self.action.as_str(),
            self.target,
            self.value.as_deref().unwrap_or("\u{0}"),
            self.assertion.as_deref().unwrap_or("\u{0}"),
        )
    }
}

/// Unvalidated step as produced by the inference capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateStep {
    pub action: Option<String>,
    pub target: Option<String>,
    pub value: Option<String>,
    pub assertion: Option<String>,
}

impl TryFrom<CandidateStep> for StepModel {
    type Error = InvalidStep;

    fn try_from(candidate: CandidateStep) -> Result<Self, Self::Error> {
        let action: StepAction = candidate.action.as_deref().unwrap_or_default().parse()?;
        StepModel::new(
            action,
            candidate.target.unwrap_or_default().trim(),
            candidate.value,
            candidate
                .assertion
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        )
    }
}
