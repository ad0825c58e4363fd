//! Playwright test module emission.

use std::fmt::Write as _;

use crate::models::{EnvironmentConfig, StepAction, StepModel};

/// Fallback pause for `wait` steps without a usable duration.
const DEFAULT_WAIT_MS: u64 = 1_000;

/// Quotes `raw` as a single-quoted JavaScript string literal.
pub(crate) fn js_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Emits the complete test module.
pub(crate) fn render_module(
    test_name: &str,
    title: Option<&str>,
    steps: &[StepModel],
    env: &EnvironmentConfig,
) -> String {
    let mut out = String::new();
    out.push_str("import { test, expect } from '@playwright/test';\n\n");

    out.push_str("test.use({\n");
    if let Some(base_url) = env.base_url() {
        let _ = writeln!(out, "  baseURL: {},", js_string(base_url));
    }
    let _ = writeln!(out, "  browserName: {},", js_string(&env.browser));
    let _ = writeln!(out, "  headless: {},", env.headless);
    let _ = writeln!(out, "  actionTimeout: {},", env.timeout_ms);
    out.push_str("});\n");
    if env.retries > 0 {
        let _ = writeln!(out, "test.describe.configure({{ retries: {} }});", env.retries);
    }
    out.push('\n');

    let description = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{test_name}: {title}"),
        None => test_name.to_string(),
    };
    let _ = writeln!(
        out,
        "test({}, async ({{ page }}) => {{",
        js_string(&description)
    );

    for (index, step) in steps.iter().enumerate() {
        let _ = writeln!(out, "  // Step {}: {}", index + 1, step.action.as_str());
        for line in render_step(test_name, index, step) {
            let _ = writeln!(out, "  {line}");
        }
    }

    out.push_str("});\n");
    out
}

fn locator(target: &str) -> String {
    format!("page.locator({})", js_string(target))
}

/// Instructions for one step; assert-class steps end in an `expect`.
fn render_step(test_name: &str, index: usize, step: &StepModel) -> Vec<String> {
    let target = step.target.trim();
    let value = step.value.as_deref().unwrap_or_default();
    let assertion = step.assertion.as_deref().unwrap_or_default();

    let line = match step.action {
        StepAction::Navigate => format!("await page.goto({});", js_string(target)),
        StepAction::Click => format!("await {}.click();", locator(target)),
        StepAction::DoubleClick => format!("await {}.dblclick();", locator(target)),
        StepAction::Fill => format!("await {}.fill({});", locator(target), js_string(value)),
        StepAction::Select => format!(
            "await {}.selectOption({});",
            locator(target),
            js_string(value)
        ),
        StepAction::Hover => format!("await {}.hover();", locator(target)),
        StepAction::Press if target.is_empty() => {
            format!("await page.keyboard.press({});", js_string(value))
        }
        StepAction::Press => format!("await {}.press({});", locator(target), js_string(value)),
        StepAction::Check => format!("await {}.check();", locator(target)),
        StepAction::Uncheck => format!("await {}.uncheck();", locator(target)),
        StepAction::Wait if !target.is_empty() => format!("await {}.waitFor();", locator(target)),
        StepAction::Wait => {
            let ms = value.trim().parse::<u64>().unwrap_or(DEFAULT_WAIT_MS);
            format!("await page.waitForTimeout({ms});")
        }
        StepAction::Screenshot => {
            let path = if target.is_empty() {
                format!("screenshots/{test_name}-step-{}.png", index + 1)
            } else {
                target.to_string()
            };
            format!("await page.screenshot({{ path: {} }});", js_string(&path))
        }
        StepAction::AssertText => format!(
            "await expect({}).toContainText({});",
            locator(target),
            js_string(assertion)
        ),
        StepAction::AssertVisible => format!("await expect({}).toBeVisible();", locator(target)),
        StepAction::AssertHidden => format!("await expect({}).toBeHidden();", locator(target)),
        StepAction::AssertUrl => {
            format!("await expect(page).toHaveURL({});", js_string(assertion))
        }
        StepAction::AssertTitle => {
            format!("await expect(page).toHaveTitle({});", js_string(assertion))
        }
        StepAction::AssertValue => format!(
            "await expect({}).toHaveValue({});",
            locator(target),
            js_string(assertion)
        ),
    };

    match step.action {
        StepAction::AssertVisible | StepAction::AssertHidden => {
            vec![format!("// expected: {}", single_line(assertion)), line]
        }
        _ => vec![line],
    }
}

/// Collapses line terminators so free text can sit in a `//` comment.
///
/// JavaScript also ends a line comment at U+2028 and U+2029.
fn single_line(text: &str) -> String {
    text.split(['\n', '\r', '\u{2028}', '\u{2029}'])
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escaping() {
        assert_eq!(js_string("plain"), "'plain'");
        assert_eq!(js_string("it's"), r"'it\'s'");
        assert_eq!(js_string("a\\b"), r"'a\\b'");
        assert_eq!(js_string("line\nbreak"), r"'line\nbreak'");
        assert_eq!(js_string("\u{1}"), r"'\u0001'");
    }

    #[test]
    fn test_assertions_compile_to_expect() {
        let step = StepModel::new(
            StepAction::AssertText,
            "h1",
            None,
            Some("Welcome".to_string()),
        )
        .unwrap();
        let lines = render_step("t", 0, &step);
        assert_eq!(
            lines,
            vec!["await expect(page.locator('h1')).toContainText('Welcome');".to_string()]
        );
    }

    #[test]
    fn test_press_without_target_uses_keyboard() {
        let step = StepModel::new(StepAction::Press, "", Some("Enter".to_string()), None).unwrap();
        assert_eq!(
            render_step("t", 0, &step),
            vec!["await page.keyboard.press('Enter');".to_string()]
        );
    }

    #[test]
    fn test_visible_assertion_keeps_expectation_as_comment() {
        let step = StepModel::new(
            StepAction::AssertVisible,
            "#banner",
            None,
            Some("banner\nshown".to_string()),
        )
        .unwrap();
        let lines = render_step("t", 0, &step);
        assert_eq!(lines[0], "// expected: banner shown");
        assert_eq!(lines[1], "await expect(page.locator('#banner')).toBeVisible();");
    }

    #[test]
    fn test_expectation_comment_folds_unicode_line_separators() {
        let step = StepModel::new(
            StepAction::AssertVisible,
            "#banner",
            None,
            Some("shown\u{2028}process.exit(1)\u{2029}done".to_string()),
        )
        .unwrap();
        let lines = render_step("t", 0, &step);
        assert_eq!(lines[0], "// expected: shown process.exit(1) done");
        assert!(!lines[0].contains(['\u{2028}', '\u{2029}']));
        assert_eq!(lines.len(), 2);
    }
}
