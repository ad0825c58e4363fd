//! Terminal rendering of the markdown produced by the display wrappers.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// Prints markdown either styled with termimad or as plain text.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.code_block.set_bg(Color::AnsiValue(238));
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Renders markdown to stdout.
    ///
    /// Headers keep their `#` markers; fenced code blocks (generated test
    /// sources) are printed verbatim so they stay copy-pasteable.
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            if !markdown.ends_with('\n') {
                println!();
            }
            return Ok(());
        }

        let mut in_code_block = false;
        for line in markdown.lines() {
            if line.trim_start().starts_with("```") {
                in_code_block = !in_code_block;
                println!("\x1b[90m{line}\x1b[0m");
            } else if in_code_block {
                println!("{line}");
            } else if line.starts_with('#') {
                println!("\x1b[34m{line}\x1b[0m");
            } else {
                self.skin.print_inline(line);
                println!();
            }
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
