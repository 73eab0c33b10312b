//! Status badges.

use owo_colors::OwoColorize;

/// Badge types for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Ok,
    Warn,
    Err,
    Info,
    Locked,
}

impl Badge {
    /// Get badge text (e.g., "[OK]")
    pub fn text(&self) -> &'static str {
        match self {
            Self::Ok => "[OK]",
            Self::Warn => "[WARN]",
            Self::Err => "[ERR]",
            Self::Info => "[INFO]",
            Self::Locked => "[LOCKED]",
        }
    }

    /// Get badge with symbol for display.
    pub fn display(&self, unicode: bool) -> &'static str {
        if !unicode {
            return self.text();
        }
        match self {
            Self::Ok => "[\u{2713}]",
            Self::Warn => "[\u{26A0}]",
            Self::Err => "[\u{2717}]",
            Self::Info => "[\u{2139}]",
            Self::Locked => "[\u{1F512}]",
        }
    }

    /// Render the badge, colored when `color` is set.
    pub fn paint(&self, unicode: bool, color: bool) -> String {
        let text = self.display(unicode);
        if !color {
            return text.to_string();
        }
        match self {
            Self::Ok => text.green().to_string(),
            Self::Warn => text.yellow().to_string(),
            Self::Err => text.red().to_string(),
            Self::Info => text.cyan().to_string(),
            Self::Locked => text.magenta().to_string(),
        }
    }
}
