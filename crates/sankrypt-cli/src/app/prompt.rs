//! Terminal prompter: SANKRYPT_PASSWORD first, then dialoguer prompts.

use std::cell::RefCell;
use std::io;

use dialoguer::{Confirm, Password};
use secrecy::{ExposeSecret, SecretString};

use sankrypt_core::crypto::PasswordIssue;
use sankrypt_core::{Notice, PasswordPrompt, Prompter, Question, SankryptError};

use crate::constants::env;
use crate::ui::{hint, strength_meter, UiContext};

/// Answers core prompts from the environment or the terminal.
///
/// The environment password answers the first non-retry prompt only, plus
/// the confirmation that follows it. Without a terminal, retries fail
/// authentication and other missing input is an error rather than a hang.
pub struct TerminalPrompter {
    ui: UiContext,
    env_password: RefCell<Option<SecretString>>,
    env_confirmation: RefCell<Option<SecretString>>,
    rejected: RefCell<Option<Vec<PasswordIssue>>>,
}

impl TerminalPrompter {
    pub fn new(ui: UiContext, env_password: Option<SecretString>) -> Self {
        Self {
            ui,
            env_password: RefCell::new(env_password),
            env_confirmation: RefCell::new(None),
            rejected: RefCell::new(None),
        }
    }

    /// Whether a password will come from the environment.
    pub fn has_env_password(&self) -> bool {
        self.env_password.borrow().is_some()
    }

    fn interactive(&self) -> bool {
        self.ui.is_interactive()
    }

    fn ask(&self, label: &str) -> sankrypt_core::Result<Option<SecretString>> {
        match Password::new()
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()
        {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(dialoguer::Error::IO(err)) => Err(err.into()),
        }
    }

    fn yes_no(&self, label: &str, default: bool) -> sankrypt_core::Result<bool> {
        match Confirm::new().with_prompt(label).default(default).interact() {
            Ok(answer) => Ok(answer),
            Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => Ok(false),
            Err(dialoguer::Error::IO(err)) => Err(err.into()),
        }
    }

    fn missing_input() -> SankryptError {
        SankryptError::InvalidInput(format!(
            "Password required: set {} or run in a terminal",
            env::PASSWORD
        ))
    }
}

impl Prompter for TerminalPrompter {
    fn password(&self, prompt: &PasswordPrompt) -> sankrypt_core::Result<Option<SecretString>> {
        if let PasswordPrompt::Retry {
            path,
            attempts_left,
        } = prompt
        {
            if !self.interactive() {
                return Err(SankryptError::AuthenticationFailure);
            }
            return self.ask(&format!(
                "Password for {} ({} attempt(s) left)",
                path.display(),
                attempts_left
            ));
        }

        if matches!(prompt, PasswordPrompt::ConfirmNew) {
            if let Some(secret) = self.env_confirmation.borrow_mut().take() {
                return Ok(Some(secret));
            }
        }
        if let Some(secret) = self.env_password.borrow_mut().take() {
            if matches!(prompt, PasswordPrompt::SetNew) {
                *self.env_confirmation.borrow_mut() =
                    Some(SecretString::from(secret.expose_secret().to_string()));
            }
            return Ok(Some(secret));
        }
        if !self.interactive() {
            if matches!(prompt, PasswordPrompt::SetNew) {
                if let Some(issues) = self.rejected.borrow_mut().take() {
                    return Err(SankryptError::PasswordPolicy(issues));
                }
            }
            return Err(Self::missing_input());
        }

        match prompt {
            PasswordPrompt::SetNew => {
                let answer = self.ask("New master password")?;
                if let Some(secret) = &answer {
                    let score = sankrypt_core::score_strength(secret.expose_secret());
                    eprintln!("{}", strength_meter(&self.ui, score));
                }
                Ok(answer)
            }
            PasswordPrompt::ConfirmNew => self.ask("Confirm master password"),
            PasswordPrompt::Verify { artifacts, hint: reminder } => {
                if let Some(reminder) = reminder {
                    eprintln!("{}", hint(&self.ui, reminder));
                }
                self.ask(&format!(
                    "Master password ({} encrypted file(s) in vault)",
                    artifacts
                ))
            }
            PasswordPrompt::Unlock { path, hint: reminder } => {
                if let Some(reminder) = reminder {
                    eprintln!("{}", hint(&self.ui, reminder));
                }
                self.ask(&format!("Password for {}", path.display()))
            }
            PasswordPrompt::Retry { .. } => Ok(None),
        }
    }

    fn confirm(&self, question: &Question) -> sankrypt_core::Result<bool> {
        let interactive = self.interactive();
        match question {
            Question::RetryVerification { attempts_left } => {
                if !interactive {
                    return Err(SankryptError::AuthenticationFailure);
                }
                self.yes_no(
                    &format!("Try again? ({} attempt(s) left)", attempts_left),
                    true,
                )
            }
            Question::RetryAfterMismatch { attempts_left } => {
                if !interactive {
                    return Err(SankryptError::InvalidInput(
                        "Passwords did not match".to_string(),
                    ));
                }
                self.yes_no(
                    &format!("Try again? ({} attempt(s) left)", attempts_left),
                    true,
                )
            }
            Question::UseRenamedTarget {
                canonical,
                proposed,
            } => {
                if !interactive {
                    if !self.ui.quiet {
                        eprintln!(
                            "{} exists; writing {} instead.",
                            canonical.display(),
                            proposed.display()
                        );
                    }
                    return Ok(true);
                }
                self.yes_no(
                    &format!(
                        "{} exists. Write {} instead?",
                        canonical.display(),
                        proposed.display()
                    ),
                    true,
                )
            }
            Question::DeleteOriginal { path } => {
                if !interactive {
                    return Ok(false);
                }
                self.yes_no(&format!("Delete the original {}?", path.display()), false)
            }
        }
    }

    fn notice(&self, notice: &Notice) {
        match notice {
            Notice::PasswordRejected(report) => {
                for issue in &report.issues {
                    eprintln!("{}", issue);
                }
                *self.rejected.borrow_mut() = Some(report.issues.clone());
            }
            Notice::PasswordsDoNotMatch { attempts_left } => {
                eprintln!(
                    "Passwords do not match. {} attempt(s) remaining.",
                    attempts_left
                );
            }
            Notice::WrongPassword { attempts_left } => {
                eprintln!("Incorrect password. {} attempts remaining.", attempts_left);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn prompter(password: Option<&str>) -> TerminalPrompter {
        TerminalPrompter::new(
            UiContext::plain(),
            password.map(|p| SecretString::from(p.to_string())),
        )
    }

    #[test]
    fn test_env_password_answers_once() {
        let prompter = prompter(Some("Env-Password-9!"));
        assert!(prompter.has_env_password());
        let first = prompter.password(&PasswordPrompt::SetNew).unwrap().unwrap();
        assert_eq!(first.expose_secret(), "Env-Password-9!");
        assert!(!prompter.has_env_password());

        let confirmation = prompter
            .password(&PasswordPrompt::ConfirmNew)
            .unwrap()
            .unwrap();
        assert_eq!(confirmation.expose_secret(), "Env-Password-9!");
    }

    #[test]
    fn test_env_password_never_answers_retry() {
        let prompter = prompter(Some("Env-Password-9!"));
        let retry = PasswordPrompt::Retry {
            path: PathBuf::from("a.md.skenc"),
            attempts_left: 2,
        };
        if !prompter.interactive() {
            assert!(matches!(
                prompter.password(&retry),
                Err(SankryptError::AuthenticationFailure)
            ));
            assert!(prompter.has_env_password());
        }
    }

    #[test]
    fn test_rejected_env_password_reports_policy() {
        let prompter = prompter(None);
        if prompter.interactive() {
            return;
        }
        prompter.notice(&Notice::PasswordRejected(
            sankrypt_core::validate_password("weak"),
        ));
        assert!(matches!(
            prompter.password(&PasswordPrompt::SetNew),
            Err(SankryptError::PasswordPolicy(_))
        ));
    }

    #[test]
    fn test_non_interactive_defaults() {
        let prompter = prompter(None);
        if prompter.interactive() {
            return;
        }
        assert!(prompter
            .confirm(&Question::UseRenamedTarget {
                canonical: PathBuf::from("a.md.skenc"),
                proposed: PathBuf::from("a-x1y2.md.skenc"),
            })
            .unwrap());
        assert!(!prompter
            .confirm(&Question::DeleteOriginal {
                path: PathBuf::from("a.md"),
            })
            .unwrap());
        assert!(prompter
            .password(&PasswordPrompt::Verify {
                artifacts: 1,
                hint: None,
            })
            .is_err());
    }
}
