//! User interaction contract.
//!
//! The session suspends on these calls while the host asks the user.
//! Returning `Ok(None)` from [`Prompter::password`] (or `Ok(false)` from
//! [`Prompter::confirm`] on a retry question) means the user backed out.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::crypto::PasswordReport;
use crate::error::Result;

/// Which password the session is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordPrompt {
    /// First password for an empty vault; hosts may show a strength meter
    SetNew,
    /// Repeat of [`PasswordPrompt::SetNew`]
    ConfirmNew,
    /// Password for a vault that already holds `artifacts` encrypted files
    Verify {
        artifacts: usize,
        hint: Option<String>,
    },
    /// Password to open a specific artifact while the session is locked
    Unlock {
        path: PathBuf,
        hint: Option<String>,
    },
    /// Another try after a wrong password
    Retry { path: PathBuf, attempts_left: u32 },
}

/// Yes/no decisions the session delegates to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    RetryAfterMismatch { attempts_left: u32 },
    RetryVerification { attempts_left: u32 },
    UseRenamedTarget { canonical: PathBuf, proposed: PathBuf },
    DeleteOriginal { path: PathBuf },
}

/// Information the host should show but need not answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PasswordRejected(PasswordReport),
    PasswordsDoNotMatch { attempts_left: u32 },
    WrongPassword { attempts_left: u32 },
}

pub trait Prompter {
    /// Ask for a password. `Ok(None)` means cancelled.
    fn password(&self, prompt: &PasswordPrompt) -> Result<Option<SecretString>>;

    /// Ask a yes/no question.
    fn confirm(&self, question: &Question) -> Result<bool>;

    fn notice(&self, _notice: &Notice) {}
}

/// A prompter that replays canned answers, for tests and scripted hosts.
///
/// Password answers of `None` cancel; once the script runs out every
/// further prompt cancels too. Confirmations default to `true` when their
/// script is empty.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    passwords: RefCell<VecDeque<Option<String>>>,
    confirmations: RefCell<VecDeque<bool>>,
    asked: RefCell<Vec<PasswordPrompt>>,
    questions: RefCell<Vec<Question>>,
    notices: RefCell<Vec<Notice>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passwords: RefCell::new(passwords.into_iter().map(|p| Some(p.into())).collect()),
            ..Self::default()
        }
    }

    /// Queue a cancellation after the already-scripted passwords.
    pub fn then_cancel(self) -> Self {
        self.passwords.borrow_mut().push_back(None);
        self
    }

    pub fn with_confirmations(self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.confirmations.borrow_mut().extend(answers);
        self
    }

    /// Password prompts shown so far.
    pub fn asked(&self) -> Vec<PasswordPrompt> {
        self.asked.borrow().clone()
    }

    pub fn questions(&self) -> Vec<Question> {
        self.questions.borrow().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn password(&self, prompt: &PasswordPrompt) -> Result<Option<SecretString>> {
        self.asked.borrow_mut().push(prompt.clone());
        Ok(self
            .passwords
            .borrow_mut()
            .pop_front()
            .flatten()
            .map(SecretString::from))
    }

    fn confirm(&self, question: &Question) -> Result<bool> {
        self.questions.borrow_mut().push(question.clone());
        Ok(self.confirmations.borrow_mut().pop_front().unwrap_or(true))
    }

    fn notice(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_scripted_prompter_replays_and_cancels() {
        let prompter = ScriptedPrompter::new(["first"]).then_cancel();

        let first = prompter.password(&PasswordPrompt::SetNew).unwrap();
        assert_eq!(first.unwrap().expose_secret(), "first");
        assert!(prompter.password(&PasswordPrompt::ConfirmNew).unwrap().is_none());
        assert!(prompter.password(&PasswordPrompt::ConfirmNew).unwrap().is_none());
        assert_eq!(prompter.asked().len(), 3);
    }

    #[test]
    fn test_confirmations_default_to_yes() {
        let prompter = ScriptedPrompter::default().with_confirmations([false]);
        let question = Question::RetryAfterMismatch { attempts_left: 1 };
        assert!(!prompter.confirm(&question).unwrap());
        assert!(prompter.confirm(&question).unwrap());
    }
}
