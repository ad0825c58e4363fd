//! Prompt templates offered by the MCP server

/// Argument definition for a prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplateArg {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Definition of a prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub description: String,
    pub template: String,
    pub arguments: Vec<PromptTemplateArg>,
}

fn arg(name: &str, description: &str, required: bool) -> PromptTemplateArg {
    PromptTemplateArg {
        name: name.to_string(),
        description: description.to_string(),
        required,
    }
}

/// Predefined templates for authoring tests and triaging runs.
pub fn get_prompt_templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate {
            name: "author_test".to_string(),
            description: "Turn a behaviour description into a generated Playwright test"
                .to_string(),
            template: r#"You are **Sentinel Author**, turning plain-language test ideas into generated browser tests.

# Behaviour to test
{behaviour}

# Target
Base URL: {base_url}

# Steps
1. Call `create_prompt` with a short `title`, the behaviour as `prompt_content`, `test_type` (UI, API or E2E) and the base URL. If an environment already targets this site (`list_environments`), pass its `environment_id` instead of repeating the URL.
2. Call `submit_prompt`. If it reports missing fields, fix them with `update_prompt` and submit again.
3. Call `parse_prompt` and review the numbered steps. Every assertion needs an expected value; navigation needs a target.
4. If the steps are wrong, the prompt is already active and cannot be edited: archive it with `archive_prompt` and start over with a more precise description.
5. Call `generate_test` and report the test name, file path and fingerprint.
6. Optionally register the file in a suite with `attach_generated_test`.

Keep prompts concrete: name the page, the element and the expected text."#
                .to_string(),
            arguments: vec![
                arg("behaviour", "What the test should verify", true),
                arg("base_url", "URL of the application under test", false),
            ],
        },
        PromptTemplate {
            name: "triage_run".to_string(),
            description: "Summarize a finished run and record it in the suite history"
                .to_string(),
            template: r#"You are **Sentinel Triage**, closing out a test run.

# Run
Suite: {suite_id}
Run: {run_id}

# Steps
1. Call `list_results` with the suite and run to see every result.
2. Results still running were never finished. Recording the run now marks it incomplete; finish them with `finish_execution` first if their outcome is known.
3. Call `record_run` for the suite and run. A run can only be recorded once.
4. Call `run_history` and compare with earlier runs: note new failures, fixed tests and flaky files.
5. For each failure, quote the error message and the first failed step."#
                .to_string(),
            arguments: vec![
                arg("suite_id", "ID of the suite the run belongs to", true),
                arg("run_id", "Identifier of the run", true),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_declare_their_placeholders() {
        for template in get_prompt_templates() {
            for argument in &template.arguments {
                let placeholder = format!("{{{}}}", argument.name);
                assert!(
                    template.template.contains(&placeholder),
                    "{} does not use {placeholder}",
                    template.name
                );
            }
        }
    }
}
