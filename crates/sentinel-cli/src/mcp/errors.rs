//! Error mapping for the MCP server

use rmcp::ErrorData;
use sentinel_core::PipelineError;

/// Converts a pipeline error into an MCP error.
///
/// Errors caused by the request (unknown IDs, lifecycle violations, invalid
/// input) become `invalid_params`; storage, inference and file system
/// failures become `internal_error`.
pub fn to_mcp_error(message: &str, error: PipelineError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error {
        PipelineError::InvalidStep(_)
        | PipelineError::IncompletePromptState { .. }
        | PipelineError::InvalidLifecycleState { .. }
        | PipelineError::DoubleFinish { .. }
        | PipelineError::DuplicateRun { .. }
        | PipelineError::PromptNotFound { .. }
        | PipelineError::SuiteNotFound { .. }
        | PipelineError::ResultNotFound { .. }
        | PipelineError::EnvironmentNotFound { .. }
        | PipelineError::GeneratedTestNotFound { .. }
        | PipelineError::InvalidInput { .. } => ErrorData::invalid_params(text, None),
        _ => ErrorData::internal_error(text, None),
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_request_errors_are_invalid_params() {
        let error = to_mcp_error("Failed to finish", PipelineError::DoubleFinish { id: 3 });
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
        assert!(error.message.contains("already been finished"));
    }

    #[test]
    fn test_other_errors_are_internal() {
        let error = to_mcp_error(
            "Failed to parse",
            PipelineError::parse_failure("inference timed out after 30s"),
        );
        assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
        assert!(error.message.starts_with("Failed to parse: "));
    }
}
