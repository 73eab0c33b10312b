//! UI context for environment detection.

use std::io::IsTerminal;

use super::mode::OutputMode;

/// Terminal and environment context for UI decisions.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether stdout is a TTY
    pub is_tty: bool,
    /// Whether color output is enabled
    pub color: bool,
    /// Whether unicode symbols are enabled
    pub unicode: bool,
    /// Suppress confirmations and progress
    pub quiet: bool,
    /// Resolved output mode
    pub mode: OutputMode,
}

impl UiContext {
    /// Create context from environment and CLI flags.
    pub fn from_env(json_flag: bool, quiet: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
        let no_color_env = std::env::var("NO_COLOR").is_ok();

        Self {
            is_tty,
            color: is_tty && !no_color_env && !term_is_dumb,
            unicode: is_tty && !term_is_dumb,
            quiet,
            mode: OutputMode::resolve(json_flag, is_tty, term_is_dumb),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            is_tty: false,
            color: false,
            unicode: false,
            quiet: false,
            mode: OutputMode::Plain,
        }
    }

    /// Check if interactive prompts are allowed.
    pub fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }

    /// Check if progress bars are allowed.
    pub fn allows_animation(&self) -> bool {
        self.is_tty && !self.quiet && self.mode.is_pretty()
    }
}
