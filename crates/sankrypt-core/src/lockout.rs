//! Failed-attempt tracking and timed lockout.
//!
//! Three consecutive wrong passwords against one artifact block further
//! attempts on that path for sixty seconds. A blocked attempt is rejected
//! before any key derivation happens. Format errors never count.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{Result, SankryptError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_LOCKOUT_SECONDS: u64 = 60;
/// Longest window a lockout may last; longer policies are capped to it.
pub const MAX_LOCKOUT_SECONDS: u64 = 86_400;

/// How many lockout records may be active at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockoutScope {
    /// Every artifact has its own record.
    #[default]
    PerArtifact,
    /// Only the most recent lockout is kept; a new one replaces it.
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub window: Duration,
    pub scope: LockoutScope,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: Duration::from_secs(DEFAULT_LOCKOUT_SECONDS),
            scope: LockoutScope::PerArtifact,
        }
    }
}

/// Answer to "may I try this artifact now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockStatus {
    pub blocked: bool,
    pub remaining_seconds: u64,
}

impl BlockStatus {
    const OPEN: BlockStatus = BlockStatus {
        blocked: false,
        remaining_seconds: 0,
    };
}

/// What a recorded failure led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    Retry { attempts_left: u32 },
    LockedOut { remaining_seconds: u64 },
}

/// An active lockout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutRecord {
    pub artifact_path: PathBuf,
    pub blocked_until: Instant,
}

pub struct LockoutGuard {
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
    failures: HashMap<PathBuf, u32>,
    records: HashMap<PathBuf, Instant>,
}

fn ceil_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

impl LockoutGuard {
    pub fn new(policy: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            failures: HashMap::new(),
            records: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    fn window(&self) -> Duration {
        self.policy
            .window
            .min(Duration::from_secs(MAX_LOCKOUT_SECONDS))
    }

    /// Whether `path` is inside its lockout window. Expired records are
    /// cleared by this query.
    pub fn is_blocked(&mut self, path: &Path) -> BlockStatus {
        let Some(until) = self.records.get(path).copied() else {
            return BlockStatus::OPEN;
        };
        let now = self.clock.now();
        if now >= until {
            self.records.remove(path);
            debug!(path = %path.display(), "lockout expired");
            return BlockStatus::OPEN;
        }
        BlockStatus {
            blocked: true,
            remaining_seconds: ceil_seconds(until - now),
        }
    }

    /// Fail with `SankryptError::LockedOut` if `path` is blocked.
    pub fn ensure_open(&mut self, path: &Path) -> Result<()> {
        let status = self.is_blocked(path);
        if status.blocked {
            return Err(SankryptError::LockedOut {
                path: path.to_path_buf(),
                remaining_seconds: status.remaining_seconds,
            });
        }
        Ok(())
    }

    /// Count a wrong password against `path`.
    pub fn record_failure(&mut self, path: &Path) -> FailureOutcome {
        let count = self.failures.entry(path.to_path_buf()).or_insert(0);
        *count += 1;
        let count = *count;

        if count < self.policy.max_attempts {
            return FailureOutcome::Retry {
                attempts_left: self.policy.max_attempts - count,
            };
        }

        self.failures.remove(path);
        if self.policy.scope == LockoutScope::Single {
            self.records.clear();
        }
        let now = self.clock.now();
        let window = self.window();
        let until = now.checked_add(window).unwrap_or(now);
        self.records.insert(path.to_path_buf(), until);
        warn!(
            path = %path.display(),
            attempts = count,
            seconds = window.as_secs(),
            "too many failed attempts, artifact locked out"
        );
        FailureOutcome::LockedOut {
            remaining_seconds: ceil_seconds(until - now),
        }
    }

    /// A correct password resets the failure count for `path`.
    pub fn record_success(&mut self, path: &Path) {
        self.failures.remove(path);
    }

    /// Consecutive failures recorded against `path` since its last success
    /// or lockout.
    pub fn failures(&self, path: &Path) -> u32 {
        self.failures.get(path).copied().unwrap_or(0)
    }

    /// Records whose windows have not yet elapsed, ordered by path.
    pub fn active_records(&self) -> Vec<LockoutRecord> {
        let now = self.clock.now();
        let mut records: Vec<LockoutRecord> = self
            .records
            .iter()
            .filter(|(_, until)| now < **until)
            .map(|(path, until)| LockoutRecord {
                artifact_path: path.clone(),
                blocked_until: *until,
            })
            .collect();
        records.sort_by(|a, b| a.artifact_path.cmp(&b.artifact_path));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn guard(scope: LockoutScope) -> (LockoutGuard, ManualClock) {
        let clock = ManualClock::new();
        let policy = LockoutPolicy {
            scope,
            ..LockoutPolicy::default()
        };
        (LockoutGuard::new(policy, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_three_failures_block_for_sixty_seconds() {
        let (mut guard, clock) = guard(LockoutScope::PerArtifact);
        let path = Path::new("diary.md.skenc");

        assert_eq!(
            guard.record_failure(path),
            FailureOutcome::Retry { attempts_left: 2 }
        );
        assert_eq!(
            guard.record_failure(path),
            FailureOutcome::Retry { attempts_left: 1 }
        );
        assert_eq!(
            guard.record_failure(path),
            FailureOutcome::LockedOut {
                remaining_seconds: 60
            }
        );

        let status = guard.is_blocked(path);
        assert!(status.blocked);
        assert_eq!(status.remaining_seconds, 60);

        clock.advance(Duration::from_millis(59_500));
        assert_eq!(guard.is_blocked(path).remaining_seconds, 1);

        clock.advance(Duration::from_millis(500));
        assert!(!guard.is_blocked(path).blocked);
        assert!(guard.active_records().is_empty());
        assert!(guard.ensure_open(path).is_ok());
    }

    #[test]
    fn test_block_applies_to_exact_path_only() {
        let (mut guard, _clock) = guard(LockoutScope::PerArtifact);
        for _ in 0..3 {
            guard.record_failure(Path::new("a.skenc"));
        }
        assert!(guard.is_blocked(Path::new("a.skenc")).blocked);
        assert!(!guard.is_blocked(Path::new("b.skenc")).blocked);

        match guard.ensure_open(Path::new("a.skenc")) {
            Err(SankryptError::LockedOut {
                remaining_seconds, ..
            }) => assert_eq!(remaining_seconds, 60),
            other => panic!("expected lockout, got {:?}", other),
        }
    }

    #[test]
    fn test_success_resets_failure_count() {
        let (mut guard, _clock) = guard(LockoutScope::PerArtifact);
        let path = Path::new("a.skenc");
        guard.record_failure(path);
        guard.record_failure(path);
        guard.record_success(path);
        assert_eq!(guard.failures(path), 0);
        assert_eq!(
            guard.record_failure(path),
            FailureOutcome::Retry { attempts_left: 2 }
        );
    }

    #[test]
    fn test_per_artifact_scope_keeps_both_lockouts() {
        let (mut guard, _clock) = guard(LockoutScope::PerArtifact);
        for _ in 0..3 {
            guard.record_failure(Path::new("a.skenc"));
            guard.record_failure(Path::new("b.skenc"));
        }
        assert!(guard.is_blocked(Path::new("a.skenc")).blocked);
        assert!(guard.is_blocked(Path::new("b.skenc")).blocked);
        assert_eq!(guard.active_records().len(), 2);
    }

    #[test]
    fn test_single_scope_replaces_previous_lockout() {
        let (mut guard, _clock) = guard(LockoutScope::Single);
        for _ in 0..3 {
            guard.record_failure(Path::new("a.skenc"));
        }
        for _ in 0..3 {
            guard.record_failure(Path::new("b.skenc"));
        }
        assert!(!guard.is_blocked(Path::new("a.skenc")).blocked);
        assert!(guard.is_blocked(Path::new("b.skenc")).blocked);
        assert_eq!(guard.active_records().len(), 1);
    }

    #[test]
    fn test_attempts_resume_after_window() {
        let (mut guard, clock) = guard(LockoutScope::PerArtifact);
        let path = Path::new("a.skenc");
        for _ in 0..3 {
            guard.record_failure(path);
        }
        clock.advance(Duration::from_secs(61));
        assert!(!guard.is_blocked(path).blocked);
        assert_eq!(
            guard.record_failure(path),
            FailureOutcome::Retry { attempts_left: 2 }
        );
    }

    #[test]
    fn test_oversized_window_is_capped_instead_of_overflowing() {
        let clock = ManualClock::new();
        let policy = LockoutPolicy {
            max_attempts: 1,
            window: Duration::from_secs(u64::MAX),
            scope: LockoutScope::PerArtifact,
        };
        let mut guard = LockoutGuard::new(policy, Arc::new(clock.clone()));
        let path = Path::new("a.skenc");

        assert_eq!(
            guard.record_failure(path),
            FailureOutcome::LockedOut {
                remaining_seconds: MAX_LOCKOUT_SECONDS
            }
        );
        assert_eq!(guard.is_blocked(path).remaining_seconds, MAX_LOCKOUT_SECONDS);

        clock.advance(Duration::from_secs(MAX_LOCKOUT_SECONDS));
        assert!(!guard.is_blocked(path).blocked);
    }
}
