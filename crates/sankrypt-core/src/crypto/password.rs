//! Password policy and strength scoring.
//!
//! Validation gates which passwords a new session may adopt; the strength
//! score is advisory and only shown to the user.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// One violated password rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum PasswordIssue {
    TooShort { min: usize },
    MissingLowercase,
    MissingUppercase,
    MissingDigit,
    MissingSymbol,
}

impl fmt::Display for PasswordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordIssue::TooShort { min } => {
                write!(f, "Password must be at least {} characters", min)
            }
            PasswordIssue::MissingLowercase => write!(f, "Password must contain lowercase letters"),
            PasswordIssue::MissingUppercase => write!(f, "Password must contain uppercase letters"),
            PasswordIssue::MissingDigit => write!(f, "Password must contain numbers"),
            PasswordIssue::MissingSymbol => write!(f, "Password must contain special characters"),
        }
    }
}

/// Result of [`validate_password`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordReport {
    pub valid: bool,
    pub issues: Vec<PasswordIssue>,
    pub strength: u8,
}

#[derive(Default)]
struct CharClasses {
    lower: bool,
    upper: bool,
    digit: bool,
    symbol: bool,
}

impl CharClasses {
    fn of(password: &str) -> Self {
        let mut classes = Self::default();
        for c in password.chars() {
            if c.is_ascii_lowercase() {
                classes.lower = true;
            } else if c.is_ascii_uppercase() {
                classes.upper = true;
            } else if c.is_ascii_digit() {
                classes.digit = true;
            } else {
                classes.symbol = true;
            }
        }
        classes
    }
}

/// Validate a password against the policy, reporting every violated rule.
///
/// # Examples
///
/// ```
/// use sankrypt_core::crypto::validate_password;
///
/// assert!(validate_password("Tr0ub4dor&9Zx").valid);
/// assert_eq!(validate_password("short").issues.len(), 4);
/// ```
pub fn validate_password(password: &str) -> PasswordReport {
    let classes = CharClasses::of(password);
    let mut issues = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        issues.push(PasswordIssue::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if !classes.lower {
        issues.push(PasswordIssue::MissingLowercase);
    }
    if !classes.upper {
        issues.push(PasswordIssue::MissingUppercase);
    }
    if !classes.digit {
        issues.push(PasswordIssue::MissingDigit);
    }
    if !classes.symbol {
        issues.push(PasswordIssue::MissingSymbol);
    }

    PasswordReport {
        valid: issues.is_empty(),
        issues,
        strength: score_strength(password),
    }
}

/// Score a password from 0 to 100.
pub fn score_strength(password: &str) -> u8 {
    let length = password.chars().count();
    if length == 0 {
        return 0;
    }

    let mut score = 0.0_f64;
    if length >= 12 {
        score += 25.0;
    }
    if length >= 16 {
        score += 10.0;
    }
    if length >= 20 {
        score += 10.0;
    }

    let classes = CharClasses::of(password);
    if classes.lower {
        score += 10.0;
    }
    if classes.upper {
        score += 10.0;
    }
    if classes.digit {
        score += 10.0;
    }
    if classes.symbol {
        score += 15.0;
    }

    let unique = password.chars().collect::<HashSet<_>>().len();
    score += (unique as f64 / length as f64 * 40.0).min(20.0);

    score.min(100.0) as u8
}

/// Build a hint that reveals the first and last character and the length.
///
/// Returns an empty string for passwords shorter than three characters.
pub fn password_hint(password: &str) -> String {
    let chars: Vec<char> = password.chars().collect();
    if chars.len() < 3 {
        return String::new();
    }
    format!(
        "Starts with \"{}\", ends with \"{}\", {} chars",
        chars[0],
        chars[chars.len() - 1],
        chars.len()
    )
}
