//! Master password session.
//!
//! A [`Session`] owns the only long-lived secret: the master password while
//! unlocked. Every operation that needs the password goes through it, so the
//! lockout guard, the naming resolver and the consistency verifier are always
//! consulted in the same order.
//!
//! ```text
//!            ensure_password / first successful decrypt
//!   Locked ───────────────────────────────────────────▶ Unlocked
//!     ▲                                                    │
//!     └──────────── lock / auto_lock_if_idle ──────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::clock::{Clock, SystemClock};
use crate::consistency::{self, ConsistencyReport, ConsistencyWarning};
use crate::crypto::{
    decrypt, decrypt_package, encrypt, self_test, validate_password, EncryptedPackage,
};
use crate::error::{Result, SankryptError};
use crate::lockout::{BlockStatus, FailureOutcome, LockoutGuard, LockoutPolicy};
use crate::naming::{resolve_target_path, NameOperation};
use crate::prompt::{Notice, PasswordPrompt, Prompter, Question};
use crate::storage::{is_encrypted_path, ArtifactMeta, ArtifactStore};

/// Attempts allowed when choosing the first master password.
pub const NEW_PASSWORD_ATTEMPTS: u32 = 3;

pub const DEFAULT_AUTO_LOCK_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Locked,
    Unlocked,
}

/// What happens to the plaintext source after a successful encrypt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginalAction {
    #[default]
    Remove,
    Keep,
    Ask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Idle minutes before auto-lock; 0 disables it
    pub auto_lock_minutes: u32,
    pub lockout: LockoutPolicy,
    pub original_action: OriginalAction,
    /// Shown next to password prompts for existing vaults
    pub password_hint: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_lock_minutes: DEFAULT_AUTO_LOCK_MINUTES,
            lockout: LockoutPolicy::default(),
            original_action: OriginalAction::default(),
            password_hint: None,
        }
    }
}

/// Receives lock state transitions and non-fatal warnings.
pub trait SessionObserver: Send + Sync {
    fn status_changed(&self, status: SessionStatus);

    fn warning(&self, _message: &str) {}
}

/// Result of an operation the user may back out of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }
}

/// Plaintext of an artifact plus any consistency warning raised while
/// unlocking with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    pub plaintext: String,
    pub warning: Option<ConsistencyWarning>,
}

/// What an encrypt or decrypt of a file did in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub target: PathBuf,
    /// The canonical target was taken and a suffixed name was used.
    pub renamed: bool,
    pub source_removed: bool,
    #[serde(skip)]
    pub warning: Option<ConsistencyWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReencryptionReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<(PathBuf, String)>,
}

pub struct Session {
    secret: Option<SecretString>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    last_activity: Instant,
    lockout: LockoutGuard,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status())
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let lockout = LockoutGuard::new(config.lockout, Arc::clone(&clock));
        Self {
            secret: None,
            last_activity: clock.now(),
            config,
            clock,
            lockout,
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        if self.secret.is_some() {
            SessionStatus::Unlocked
        } else {
            SessionStatus::Locked
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.secret.is_some()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn record_activity(&mut self) {
        self.last_activity = self.clock.now();
    }

    pub fn idle_for(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.last_activity)
    }

    /// Lock when the session has been idle for at least the configured
    /// number of minutes. Returns whether a lock happened.
    pub fn auto_lock_if_idle(&mut self) -> bool {
        let minutes = self.config.auto_lock_minutes;
        if minutes == 0 || !self.is_unlocked() {
            return false;
        }
        if self.idle_for() < Duration::from_secs(u64::from(minutes) * 60) {
            return false;
        }
        info!(minutes, "session idle, auto-locking");
        self.lock()
    }

    /// Erase the secret and return to `Locked`. Returns `false` if the
    /// session was already locked, in which case observers hear nothing.
    pub fn lock(&mut self) -> bool {
        self.record_activity();
        if self.secret.take().is_none() {
            return false;
        }
        info!("session locked");
        self.notify(SessionStatus::Locked);
        true
    }

    pub fn is_blocked(&mut self, path: &Path) -> BlockStatus {
        self.lockout.is_blocked(path)
    }

    pub fn lockout(&self) -> &LockoutGuard {
        &self.lockout
    }

    /// Sample artifacts with `password`. Session state is untouched.
    pub fn check_consistency(
        &self,
        store: &dyn ArtifactStore,
        password: &str,
    ) -> Result<ConsistencyReport> {
        consistency::check_consistency(store, password)
    }

    /// Make sure a trusted master password is held.
    ///
    /// Returns `Ok(false)` when the user cancels; the session is then left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// - `SankryptError::LockedOut` if the sampled artifact is in its window
    /// - `SankryptError::Format` if no artifact in the vault parses
    /// - `SankryptError::PasswordPolicy` when every new-password attempt
    ///   failed the policy
    /// - `SankryptError::InvalidInput` when confirmations never matched
    pub fn ensure_password(
        &mut self,
        store: &dyn ArtifactStore,
        prompter: &dyn Prompter,
        force_new: bool,
        skip_confirmation: bool,
    ) -> Result<bool> {
        if self.is_unlocked() && !force_new {
            return Ok(true);
        }

        let artifacts = store.encrypted_artifacts()?;
        let accepted = match first_parseable(store, &artifacts)? {
            Some((path, package)) => {
                self.verify_against_artifact(prompter, &path, &package, artifacts.len())?
            }
            None => self.choose_new_password(prompter, skip_confirmation)?,
        };

        match accepted {
            Some(secret) => {
                self.unlock_with(secret);
                Ok(true)
            }
            None => {
                debug!("password prompt cancelled");
                Ok(false)
            }
        }
    }

    fn verify_against_artifact(
        &mut self,
        prompter: &dyn Prompter,
        path: &Path,
        package: &EncryptedPackage,
        artifacts: usize,
    ) -> Result<Option<SecretString>> {
        self.lockout.ensure_open(path)?;
        let prompt = PasswordPrompt::Verify {
            artifacts,
            hint: self.config.password_hint.clone(),
        };

        loop {
            let Some(candidate) = prompter.password(&prompt)? else {
                return Ok(None);
            };
            match decrypt_package(package, candidate.expose_secret()) {
                Ok(_) => {
                    self.lockout.record_success(path);
                    return Ok(Some(candidate));
                }
                Err(SankryptError::AuthenticationFailure) => {
                    match self.lockout.record_failure(path) {
                        FailureOutcome::Retry { attempts_left } => {
                            let again = prompter
                                .confirm(&Question::RetryVerification { attempts_left })?;
                            if !again {
                                return Ok(None);
                            }
                        }
                        FailureOutcome::LockedOut { remaining_seconds } => {
                            return Err(SankryptError::LockedOut {
                                path: path.to_path_buf(),
                                remaining_seconds,
                            });
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn choose_new_password(
        &self,
        prompter: &dyn Prompter,
        skip_confirmation: bool,
    ) -> Result<Option<SecretString>> {
        let mut attempts = 0;
        let mut last_issues = Vec::new();
        let mut mismatched = false;

        while attempts < NEW_PASSWORD_ATTEMPTS {
            let Some(candidate) = prompter.password(&PasswordPrompt::SetNew)? else {
                return Ok(None);
            };

            let report = validate_password(candidate.expose_secret());
            if !report.valid {
                attempts += 1;
                last_issues = report.issues.clone();
                mismatched = false;
                prompter.notice(&Notice::PasswordRejected(report));
                continue;
            }

            if !skip_confirmation {
                let Some(confirmation) = prompter.password(&PasswordPrompt::ConfirmNew)? else {
                    return Ok(None);
                };
                if confirmation.expose_secret() != candidate.expose_secret() {
                    attempts += 1;
                    mismatched = true;
                    let attempts_left = NEW_PASSWORD_ATTEMPTS - attempts;
                    prompter.notice(&Notice::PasswordsDoNotMatch { attempts_left });
                    if attempts_left > 0
                        && !prompter.confirm(&Question::RetryAfterMismatch { attempts_left })?
                    {
                        return Ok(None);
                    }
                    continue;
                }
            }

            if !self_test(candidate.expose_secret()) {
                return Err(SankryptError::Crypto(
                    "Encryption self-test failed".to_string(),
                ));
            }
            return Ok(Some(candidate));
        }

        if mismatched {
            Err(SankryptError::InvalidInput(format!(
                "Passwords did not match after {} attempts",
                NEW_PASSWORD_ATTEMPTS
            )))
        } else {
            Err(SankryptError::PasswordPolicy(last_issues))
        }
    }

    fn unlock_with(&mut self, secret: SecretString) {
        self.secret = Some(secret);
        self.record_activity();
        info!("session unlocked");
        self.notify(SessionStatus::Unlocked);
    }

    fn notify(&self, status: SessionStatus) {
        for observer in &self.observers {
            observer.status_changed(status);
        }
    }

    fn warn_observers(&self, message: &str) {
        for observer in &self.observers {
            observer.warning(message);
        }
    }

    /// Verify `current` and re-encrypt every artifact under `new`.
    pub fn change_password(
        &mut self,
        store: &dyn ArtifactStore,
        current: &str,
        new: &str,
    ) -> Result<ReencryptionReport> {
        self.change_password_with_progress(store, current, new, |_, _, _| {})
    }

    /// Like [`Session::change_password`], calling `progress(index, total, path)`
    /// before each artifact.
    ///
    /// The session switches to `new` even when some artifacts fail, since the
    /// ones that succeeded now need it.
    ///
    /// # Errors
    ///
    /// - `SankryptError::AuthenticationFailure` if `current` is not the master password
    /// - `SankryptError::PasswordUnchanged` if `new == current`
    /// - `SankryptError::PasswordPolicy` if `new` is too weak
    /// - `SankryptError::PartialReencryption` if any artifact failed
    pub fn change_password_with_progress(
        &mut self,
        store: &dyn ArtifactStore,
        current: &str,
        new: &str,
        mut progress: impl FnMut(usize, usize, &Path),
    ) -> Result<ReencryptionReport> {
        let artifacts = store.encrypted_artifacts()?;

        let matches_secret = self
            .secret
            .as_ref()
            .is_some_and(|secret| secret.expose_secret() == current);
        if !matches_secret {
            let (sample, package) =
                first_parseable(store, &artifacts)?.ok_or(SankryptError::AuthenticationFailure)?;
            self.lockout.ensure_open(&sample)?;
            match decrypt_package(&package, current) {
                Ok(_) => self.lockout.record_success(&sample),
                Err(SankryptError::AuthenticationFailure) => {
                    self.lockout.record_failure(&sample);
                    return Err(SankryptError::AuthenticationFailure);
                }
                Err(err) => return Err(err),
            }
        }

        if new == current {
            return Err(SankryptError::PasswordUnchanged);
        }
        let report = validate_password(new);
        if !report.valid {
            return Err(SankryptError::PasswordPolicy(report.issues));
        }

        let total = artifacts.len();
        let mut outcome = ReencryptionReport::default();
        for (index, meta) in artifacts.iter().enumerate() {
            progress(index, total, &meta.path);
            match reencrypt(store, &meta.path, current, new) {
                Ok(()) => outcome.success_count += 1,
                Err(err) => {
                    warn!(path = %meta.path.display(), error = %err, "re-encryption failed");
                    outcome.failure_count += 1;
                    outcome.failures.push((meta.path.clone(), err.to_string()));
                }
            }
        }

        self.secret = Some(SecretString::from(new.to_string()));
        self.record_activity();
        self.notify(SessionStatus::Unlocked);
        info!(
            success = outcome.success_count,
            failure = outcome.failure_count,
            "master password changed"
        );

        if outcome.failure_count > 0 {
            return Err(SankryptError::PartialReencryption {
                success: outcome.success_count,
                failure: outcome.failure_count,
                failed: outcome.failures,
            });
        }
        Ok(outcome)
    }

    /// Decrypt one artifact, prompting while the session is locked or the
    /// held password does not fit.
    ///
    /// Wrong passwords count toward the artifact's lockout; the loop ends at
    /// the latest when the lockout triggers. The first success while locked
    /// unlocks the session with that password and samples other artifacts.
    pub fn decrypt_artifact(
        &mut self,
        store: &dyn ArtifactStore,
        prompter: &dyn Prompter,
        path: &Path,
    ) -> Result<Outcome<Decrypted>> {
        self.lockout.ensure_open(path)?;
        let package = EncryptedPackage::from_base64(&store.read(path)?)?;

        let mut candidate = match &self.secret {
            Some(secret) => Zeroizing::new(secret.expose_secret().to_string()),
            None => {
                let prompt = PasswordPrompt::Unlock {
                    path: path.to_path_buf(),
                    hint: self.config.password_hint.clone(),
                };
                match prompter.password(&prompt)? {
                    Some(secret) => Zeroizing::new(secret.expose_secret().to_string()),
                    None => return Ok(Outcome::Cancelled),
                }
            }
        };

        loop {
            match decrypt_package(&package, &candidate) {
                Ok(plaintext) => {
                    self.lockout.record_success(path);
                    let mut warning = None;
                    if self.is_unlocked() {
                        self.record_activity();
                    } else {
                        self.unlock_with(SecretString::from(candidate.to_string()));
                        warning = self.sample_after_unlock(store, &candidate, path);
                    }
                    return Ok(Outcome::Done(Decrypted { plaintext, warning }));
                }
                Err(SankryptError::AuthenticationFailure) => {
                    match self.lockout.record_failure(path) {
                        FailureOutcome::Retry { attempts_left } => {
                            prompter.notice(&Notice::WrongPassword { attempts_left });
                            let prompt = PasswordPrompt::Retry {
                                path: path.to_path_buf(),
                                attempts_left,
                            };
                            match prompter.password(&prompt)? {
                                Some(secret) => {
                                    candidate = Zeroizing::new(secret.expose_secret().to_string())
                                }
                                None => return Ok(Outcome::Cancelled),
                            }
                        }
                        FailureOutcome::LockedOut { remaining_seconds } => {
                            return Err(SankryptError::LockedOut {
                                path: path.to_path_buf(),
                                remaining_seconds,
                            });
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn sample_after_unlock(
        &self,
        store: &dyn ArtifactStore,
        password: &str,
        primary: &Path,
    ) -> Option<ConsistencyWarning> {
        match consistency::verify_after_unlock(store, password, primary) {
            Ok(Some(warning)) => {
                warn!(working = warning.working, failed = warning.failed, "password inconsistency");
                self.warn_observers(&warning.to_string());
                Some(warning)
            }
            Ok(None) => None,
            Err(err) => {
                debug!(error = %err, "consistency sampling skipped");
                None
            }
        }
    }

    /// Encrypt a plaintext file into a new artifact beside it.
    ///
    /// `keep_original` overrides the configured [`OriginalAction`].
    pub fn encrypt_file(
        &mut self,
        store: &dyn ArtifactStore,
        prompter: &dyn Prompter,
        path: &Path,
        keep_original: Option<bool>,
    ) -> Result<Outcome<FileReport>> {
        if is_encrypted_path(path) {
            return Err(SankryptError::InvalidInput(format!(
                "{} is already encrypted",
                path.display()
            )));
        }
        if !store.exists(path) {
            return Err(SankryptError::NotFound(format!("File {}", path.display())));
        }

        let target = resolve_target_path(store, path, NameOperation::Encrypt)?;
        if target.is_renamed() && !confirm_rename(prompter, &target.canonical, &target.path)? {
            return Ok(Outcome::Cancelled);
        }
        if !self.ensure_password(store, prompter, false, false)? {
            return Ok(Outcome::Cancelled);
        }
        let Some(secret) = self.secret.as_ref() else {
            return Ok(Outcome::Cancelled);
        };

        let plaintext = Zeroizing::new(store.read(path)?);
        let package = encrypt(&plaintext, secret.expose_secret())?;
        store.write(&target.path, &package)?;

        let remove = match keep_original {
            Some(keep) => !keep,
            None => match self.config.original_action {
                OriginalAction::Remove => true,
                OriginalAction::Keep => false,
                OriginalAction::Ask => prompter.confirm(&Question::DeleteOriginal {
                    path: path.to_path_buf(),
                })?,
            },
        };
        if remove {
            store.delete(path)?;
        }
        self.record_activity();
        info!(
            source = %path.display(),
            target_path = %target.path.display(),
            removed = remove,
            "file encrypted"
        );

        Ok(Outcome::Done(FileReport {
            source: path.to_path_buf(),
            renamed: target.is_renamed(),
            target: target.path,
            source_removed: remove,
            warning: None,
        }))
    }

    /// Decrypt an artifact back to a plaintext file and remove the artifact.
    pub fn decrypt_file(
        &mut self,
        store: &dyn ArtifactStore,
        prompter: &dyn Prompter,
        path: &Path,
    ) -> Result<Outcome<FileReport>> {
        self.lockout.ensure_open(path)?;
        let target = resolve_target_path(store, path, NameOperation::Decrypt)?;
        if target.is_renamed() && !confirm_rename(prompter, &target.canonical, &target.path)? {
            return Ok(Outcome::Cancelled);
        }

        let decrypted = match self.decrypt_artifact(store, prompter, path)? {
            Outcome::Done(decrypted) => decrypted,
            Outcome::Cancelled => return Ok(Outcome::Cancelled),
        };
        let plaintext = Zeroizing::new(decrypted.plaintext);
        store.write(&target.path, &plaintext)?;
        store.delete(path)?;
        info!(
            source = %path.display(),
            target_path = %target.path.display(),
            "file decrypted"
        );

        Ok(Outcome::Done(FileReport {
            source: path.to_path_buf(),
            renamed: target.is_renamed(),
            target: target.path,
            source_removed: true,
            warning: decrypted.warning,
        }))
    }
}

/// The first artifact that parses as a package, used to verify a password.
///
/// Files that cannot be read as text or carry a foreign format are skipped.
/// `Ok(None)` means there are no artifacts; when every one is skipped the
/// last skip reason is returned.
fn first_parseable(
    store: &dyn ArtifactStore,
    artifacts: &[ArtifactMeta],
) -> Result<Option<(PathBuf, EncryptedPackage)>> {
    let mut skipped = None;
    for meta in artifacts {
        let parsed = store
            .read(&meta.path)
            .and_then(|text| EncryptedPackage::from_base64(&text));
        match parsed {
            Ok(package) => return Ok(Some((meta.path.clone(), package))),
            Err(err @ (SankryptError::Format(_) | SankryptError::Storage(_))) => {
                debug!(path = %meta.path.display(), error = %err, "skipping unparseable artifact");
                skipped = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    match skipped {
        Some(err) => Err(err),
        None => Ok(None),
    }
}

fn confirm_rename(prompter: &dyn Prompter, canonical: &Path, proposed: &Path) -> Result<bool> {
    prompter.confirm(&Question::UseRenamedTarget {
        canonical: canonical.to_path_buf(),
        proposed: proposed.to_path_buf(),
    })
}

fn reencrypt(store: &dyn ArtifactStore, path: &Path, current: &str, new: &str) -> Result<()> {
    let plaintext = Zeroizing::new(decrypt(&store.read(path)?, current)?);
    let package = encrypt(&plaintext, new)?;
    store.write(path, &package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::clock::ManualClock;
    use crate::prompt::ScriptedPrompter;
    use crate::storage::MemoryStore;

    const MASTER: &str = "Correct-Horse-42!";
    const OTHER: &str = "Another-Secret-77?";

    #[derive(Default)]
    struct Recorder {
        statuses: Mutex<Vec<SessionStatus>>,
        warnings: Mutex<Vec<String>>,
    }

    impl SessionObserver for Recorder {
        fn status_changed(&self, status: SessionStatus) {
            self.statuses.lock().unwrap().push(status);
        }

        fn warning(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }
    }

    fn session() -> (Session, ManualClock, Arc<Recorder>) {
        let clock = ManualClock::new();
        let mut session = Session::with_clock(SessionConfig::default(), Arc::new(clock.clone()));
        let recorder = Arc::new(Recorder::default());
        session.subscribe(recorder.clone());
        (session, clock, recorder)
    }

    #[test]
    fn test_new_password_with_confirmation() {
        let (mut session, _clock, recorder) = session();
        let store = MemoryStore::new();
        let prompter = ScriptedPrompter::new([MASTER, MASTER]);

        assert!(session
            .ensure_password(&store, &prompter, false, false)
            .unwrap());
        assert_eq!(session.status(), SessionStatus::Unlocked);
        assert_eq!(
            prompter.asked(),
            vec![PasswordPrompt::SetNew, PasswordPrompt::ConfirmNew]
        );
        assert_eq!(
            *recorder.statuses.lock().unwrap(),
            vec![SessionStatus::Unlocked]
        );

        // Already unlocked: no prompt at all.
        let silent = ScriptedPrompter::default();
        assert!(session.ensure_password(&store, &silent, false, false).unwrap());
        assert!(silent.asked().is_empty());
    }

    #[test]
    fn test_weak_password_is_reprompted() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::new();
        let prompter = ScriptedPrompter::new(["short", MASTER]);

        assert!(session.ensure_password(&store, &prompter, false, true).unwrap());
        assert!(matches!(
            prompter.notices().as_slice(),
            [Notice::PasswordRejected(report)] if !report.valid
        ));
    }

    #[test]
    fn test_policy_failures_exhaust_attempts() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::new();
        let prompter = ScriptedPrompter::new(["weak", "weaker", "weakest"]);

        let result = session.ensure_password(&store, &prompter, false, true);
        assert!(matches!(result, Err(SankryptError::PasswordPolicy(_))));
        assert!(!session.is_unlocked());
    }

    #[test]
    fn test_mismatch_retry_then_decline() {
        let (mut session, _clock, recorder) = session();
        let store = MemoryStore::new();
        let prompter =
            ScriptedPrompter::new([MASTER, OTHER]).with_confirmations([false]);

        assert!(!session.ensure_password(&store, &prompter, false, false).unwrap());
        assert!(!session.is_unlocked());
        assert!(recorder.statuses.lock().unwrap().is_empty());
        assert_eq!(
            prompter.questions(),
            vec![Question::RetryAfterMismatch { attempts_left: 2 }]
        );
    }

    #[test]
    fn test_cancellation_leaves_session_locked() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::with_files([("a.md.skenc", encrypt("a", MASTER).unwrap())]);
        let prompter = ScriptedPrompter::default().then_cancel();

        assert!(!session.ensure_password(&store, &prompter, false, false).unwrap());
        assert!(!session.is_unlocked());
        assert_eq!(session.lockout().failures(Path::new("a.md.skenc")), 0);
    }

    #[test]
    fn test_existing_vault_verifies_against_first_artifact() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::with_files([("a.md.skenc", encrypt("a", MASTER).unwrap())]);
        let prompter = ScriptedPrompter::new([OTHER, MASTER]);

        assert!(session.ensure_password(&store, &prompter, false, false).unwrap());
        assert_eq!(
            prompter.questions(),
            vec![Question::RetryVerification { attempts_left: 2 }]
        );
        assert_eq!(session.lockout().failures(Path::new("a.md.skenc")), 0);
    }

    fn vault_with_foreign_first() -> MemoryStore {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;

        MemoryStore::with_files([
            ("a.md.skenc", STANDARD.encode([0x02u8; 60])),
            ("b.md.skenc", encrypt("beta", MASTER).unwrap()),
            ("c.md.skenc", encrypt("gamma", MASTER).unwrap()),
            ("d.md", "delta".to_string()),
        ])
    }

    #[test]
    fn test_unparseable_artifacts_are_skipped_when_verifying() {
        let store = vault_with_foreign_first();

        let (mut verifying, _clock, _) = session();
        let prompter = ScriptedPrompter::new([MASTER]);
        assert!(verifying.ensure_password(&store, &prompter, false, false).unwrap());
        assert_eq!(
            prompter.asked(),
            vec![PasswordPrompt::Verify {
                artifacts: 3,
                hint: None
            }]
        );

        let (mut encrypting, _clock, _) = session();
        let prompter = ScriptedPrompter::new([MASTER]);
        let report = encrypting
            .encrypt_file(&store, &prompter, Path::new("d.md"), None)
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(report.target, PathBuf::from("d.md.skenc"));

        let (mut changing, _clock, _) = session();
        let new = "Brand-New-Secret-9#";
        match changing.change_password(&store, MASTER, new) {
            Err(SankryptError::PartialReencryption {
                success,
                failure,
                failed,
            }) => {
                assert_eq!((success, failure), (3, 1));
                assert_eq!(failed[0].0, PathBuf::from("a.md.skenc"));
            }
            other => panic!("expected only the foreign file to fail, got {:?}", other),
        }
        let b = store.read(Path::new("b.md.skenc")).unwrap();
        assert_eq!(decrypt(&b, new).unwrap(), "beta");
    }

    #[test]
    fn test_vault_with_no_parseable_artifact_reports_format() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::with_files([("a.md.skenc", "not a package")]);
        let prompter = ScriptedPrompter::new([MASTER]);

        let result = session.ensure_password(&store, &prompter, false, false);
        assert!(matches!(result, Err(SankryptError::Format(_))));
        assert!(prompter.asked().is_empty());
        assert!(!session.is_unlocked());
    }

    #[test]
    fn test_lock_is_idempotent_and_auto_lock_waits_for_idle() {
        let (mut session, clock, recorder) = session();
        let store = MemoryStore::new();
        let prompter = ScriptedPrompter::new([MASTER]);
        session.ensure_password(&store, &prompter, false, true).unwrap();

        clock.advance(Duration::from_secs(29 * 60));
        assert!(!session.auto_lock_if_idle());
        session.record_activity();
        clock.advance(Duration::from_secs(29 * 60));
        assert!(!session.auto_lock_if_idle());
        clock.advance(Duration::from_secs(60));
        assert!(session.auto_lock_if_idle());
        assert!(!session.is_unlocked());

        assert!(!session.lock());
        assert_eq!(
            *recorder.statuses.lock().unwrap(),
            vec![SessionStatus::Unlocked, SessionStatus::Locked]
        );
    }

    #[test]
    fn test_auto_lock_disabled_with_zero_minutes() {
        let clock = ManualClock::new();
        let config = SessionConfig {
            auto_lock_minutes: 0,
            ..SessionConfig::default()
        };
        let mut session = Session::with_clock(config, Arc::new(clock.clone()));
        let prompter = ScriptedPrompter::new([MASTER]);
        session
            .ensure_password(&MemoryStore::new(), &prompter, false, true)
            .unwrap();

        clock.advance(Duration::from_secs(24 * 60 * 60));
        assert!(!session.auto_lock_if_idle());
        assert!(session.is_unlocked());
    }

    #[test]
    fn test_decrypt_artifact_unlocks_and_warns_on_mixed_passwords() {
        let (mut session, _clock, recorder) = session();
        let store = MemoryStore::with_files([
            ("a.md.skenc", encrypt("alpha", MASTER).unwrap()),
            ("b.md.skenc", encrypt("beta", OTHER).unwrap()),
        ]);
        let prompter = ScriptedPrompter::new([MASTER]);

        let decrypted = session
            .decrypt_artifact(&store, &prompter, Path::new("a.md.skenc"))
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(decrypted.plaintext, "alpha");
        assert_eq!(
            decrypted.warning,
            Some(ConsistencyWarning {
                working: 1,
                failed: 1
            })
        );
        assert!(session.is_unlocked());
        assert_eq!(recorder.warnings.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_decrypt_artifact_locks_out_after_three_failures() {
        let (mut session, clock, _) = session();
        let path = Path::new("a.md.skenc");
        let store = MemoryStore::with_files([("a.md.skenc", encrypt("alpha", MASTER).unwrap())]);
        let prompter = ScriptedPrompter::new(["wrong-1", "wrong-2", "wrong-3"]);

        match session.decrypt_artifact(&store, &prompter, path) {
            Err(SankryptError::LockedOut {
                remaining_seconds, ..
            }) => assert_eq!(remaining_seconds, 60),
            other => panic!("expected lockout, got {:?}", other),
        }
        assert_eq!(prompter.asked().len(), 3);
        assert!(!session.is_unlocked());

        // Blocked: rejected before any prompt.
        let blocked = ScriptedPrompter::new([MASTER]);
        assert!(matches!(
            session.decrypt_artifact(&store, &blocked, path),
            Err(SankryptError::LockedOut { .. })
        ));
        assert!(blocked.asked().is_empty());

        clock.advance(Duration::from_secs(60));
        let outcome = session.decrypt_artifact(&store, &blocked, path).unwrap();
        assert!(!outcome.is_cancelled());
    }

    #[test]
    fn test_format_error_does_not_count_toward_lockout() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::with_files([("bad.skenc", "not a package")]);
        let prompter = ScriptedPrompter::new([MASTER]);

        let result = session.decrypt_artifact(&store, &prompter, Path::new("bad.skenc"));
        assert!(matches!(result, Err(SankryptError::Format(_))));
        assert!(prompter.asked().is_empty());
        assert_eq!(session.lockout().failures(Path::new("bad.skenc")), 0);
    }

    #[test]
    fn test_change_password_partial_failure() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::with_files([
            ("a.md.skenc", encrypt("alpha", MASTER).unwrap()),
            ("b.md.skenc", encrypt("beta", MASTER).unwrap()),
            ("c.md.skenc", encrypt("gamma", OTHER).unwrap()),
        ]);
        let new = "Brand-New-Secret-9#";
        let mut seen = Vec::new();

        let result = session.change_password_with_progress(&store, MASTER, new, |i, total, path| {
            seen.push((i, total, path.to_path_buf()))
        });
        match result {
            Err(SankryptError::PartialReencryption {
                success,
                failure,
                failed,
            }) => {
                assert_eq!((success, failure), (2, 1));
                assert_eq!(failed[0].0, PathBuf::from("c.md.skenc"));
            }
            other => panic!("expected partial failure, got {:?}", other),
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], (2, 3, PathBuf::from("c.md.skenc")));

        assert!(session.is_unlocked());
        let a = store.read(Path::new("a.md.skenc")).unwrap();
        assert_eq!(decrypt(&a, new).unwrap(), "alpha");
        let c = store.read(Path::new("c.md.skenc")).unwrap();
        assert_eq!(decrypt(&c, OTHER).unwrap(), "gamma");
    }

    #[test]
    fn test_change_password_rejections() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::with_files([("a.md.skenc", encrypt("alpha", MASTER).unwrap())]);

        assert!(matches!(
            session.change_password(&store, OTHER, "Brand-New-Secret-9#"),
            Err(SankryptError::AuthenticationFailure)
        ));
        assert!(matches!(
            session.change_password(&store, MASTER, MASTER),
            Err(SankryptError::PasswordUnchanged)
        ));
        assert!(matches!(
            session.change_password(&store, MASTER, "weak"),
            Err(SankryptError::PasswordPolicy(_))
        ));
        assert!(!session.is_unlocked());
    }

    #[test]
    fn test_encrypt_file_then_decrypt_file() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::with_files([("notes/todo.md", "buy milk")]);
        let prompter = ScriptedPrompter::new([MASTER]);

        let report = session
            .encrypt_file(&store, &prompter, Path::new("notes/todo.md"), None)
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(report.target, PathBuf::from("notes/todo.md.skenc"));
        assert!(report.source_removed);
        assert!(!store.exists(Path::new("notes/todo.md")));

        let report = session
            .decrypt_file(&store, &prompter, Path::new("notes/todo.md.skenc"))
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(report.target, PathBuf::from("notes/todo.md"));
        assert_eq!(store.read(Path::new("notes/todo.md")).unwrap(), "buy milk");
        assert!(!store.exists(Path::new("notes/todo.md.skenc")));
    }

    #[test]
    fn test_declined_rename_writes_nothing() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::with_files([("a.md", "plain"), ("a.md.skenc", "occupied")]);
        let prompter = ScriptedPrompter::new([MASTER]).with_confirmations([false]);

        let outcome = session
            .encrypt_file(&store, &prompter, Path::new("a.md"), Some(true))
            .unwrap();
        assert!(outcome.is_cancelled());
        assert!(!session.is_unlocked());
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_encrypt_rejects_artifacts_and_missing_files() {
        let (mut session, _clock, _) = session();
        let store = MemoryStore::new();
        let prompter = ScriptedPrompter::default();

        assert!(matches!(
            session.encrypt_file(&store, &prompter, Path::new("a.skenc"), None),
            Err(SankryptError::InvalidInput(_))
        ));
        assert!(matches!(
            session.encrypt_file(&store, &prompter, Path::new("missing.md"), None),
            Err(SankryptError::NotFound(_))
        ));
    }
}
