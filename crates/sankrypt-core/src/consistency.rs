//! Checks that one password opens many artifacts.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::crypto::decrypt;
use crate::error::Result;
use crate::storage::ArtifactStore;

/// Extra artifacts tried after the first successful unlock.
pub const UNLOCK_SAMPLE_SIZE: usize = 2;

/// Artifacts tried by an on-demand consistency check.
pub const CHECK_SAMPLE_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub working_count: usize,
    pub failed_count: usize,
    pub total_sampled: usize,
    /// Number of artifacts in the store the sample was drawn from.
    pub total_artifacts: usize,
    pub consistent: bool,
}

/// Non-fatal notice that the unlocking password does not open every
/// sampled artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyWarning {
    /// Artifacts the password opened, including the one that unlocked the session
    pub working: usize,
    pub failed: usize,
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Password works for {} file(s) but failed for {}.",
            self.working, self.failed
        )
    }
}

fn opens(store: &dyn ArtifactStore, path: &Path, password: &str) -> bool {
    let result = store
        .read(path)
        .and_then(|package| decrypt(&package, password));
    if let Err(err) = &result {
        debug!(path = %path.display(), error = %err, "sampled artifact did not open");
    }
    result.is_ok()
}

/// Try `password` against up to [`CHECK_SAMPLE_SIZE`] artifacts.
///
/// Has no side effects on any session or lockout state.
pub fn check_consistency(store: &dyn ArtifactStore, password: &str) -> Result<ConsistencyReport> {
    let artifacts = store.encrypted_artifacts()?;
    let sample = &artifacts[..artifacts.len().min(CHECK_SAMPLE_SIZE)];

    let working_count = sample
        .iter()
        .filter(|meta| opens(store, &meta.path, password))
        .count();
    let failed_count = sample.len() - working_count;

    Ok(ConsistencyReport {
        working_count,
        failed_count,
        total_sampled: sample.len(),
        total_artifacts: artifacts.len(),
        consistent: failed_count == 0,
    })
}

/// After `primary` opened with `password`, try up to
/// [`UNLOCK_SAMPLE_SIZE`] other artifacts.
///
/// Returns a warning when any sampled artifact fails to open.
pub fn verify_after_unlock(
    store: &dyn ArtifactStore,
    password: &str,
    primary: &Path,
) -> Result<Option<ConsistencyWarning>> {
    let others: Vec<_> = store
        .encrypted_artifacts()?
        .into_iter()
        .filter(|meta| meta.path != primary)
        .take(UNLOCK_SAMPLE_SIZE)
        .collect();

    let verified = others
        .iter()
        .filter(|meta| opens(store, &meta.path, password))
        .count();
    let failed = others.len() - verified;

    if failed == 0 {
        return Ok(None);
    }
    Ok(Some(ConsistencyWarning {
        working: verified + 1,
        failed,
    }))
}
