use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use sankrypt_core::crypto::{decrypt, encrypt, score_strength};
use sankrypt_core::{
    ArtifactStore, FsStore, LockoutPolicy, LockoutScope, ManualClock, Outcome, SankryptError,
    ScriptedPrompter, Session, SessionConfig,
};
use tempfile::TempDir;

const MASTER: &str = "Vault-Master-Pass-1!";
const NEW_MASTER: &str = "Vault-Rotated-Pass-2@";

fn vault() -> (TempDir, FsStore) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = FsStore::open(dir.path()).expect("vault should open");
    (dir, store)
}

fn session_with(config: SessionConfig) -> (Session, ManualClock) {
    let clock = ManualClock::new();
    (Session::with_clock(config, Arc::new(clock.clone())), clock)
}

#[test]
fn test_encrypt_rename_and_decrypt_on_disk() {
    let (dir, store) = vault();
    fs::write(dir.path().join("journal.md"), "dear diary").unwrap();
    fs::write(dir.path().join("journal.md.skenc"), encrypt("older", MASTER).unwrap()).unwrap();

    let (mut session, _clock) = session_with(SessionConfig::default());
    let prompter = ScriptedPrompter::new([MASTER]).with_confirmations([true]);

    let report = session
        .encrypt_file(&store, &prompter, Path::new("journal.md"), Some(true))
        .unwrap()
        .done()
        .expect("encrypt should not be cancelled");

    assert!(report.renamed);
    assert!(!report.source_removed);
    assert!(dir.path().join("journal.md").exists());
    let name = report.target.to_string_lossy().to_string();
    assert!(name.starts_with("journal-") && name.ends_with(".md.skenc"));

    let package = fs::read_to_string(dir.path().join(&report.target)).unwrap();
    assert_eq!(decrypt(&package, MASTER).unwrap(), "dear diary");
}

#[test]
fn test_partial_reencryption_on_disk() {
    let (dir, store) = vault();
    fs::write(dir.path().join("a.md.skenc"), encrypt("one", MASTER).unwrap()).unwrap();
    fs::write(dir.path().join("b.md.skenc"), encrypt("two", MASTER).unwrap()).unwrap();
    fs::write(dir.path().join("c.md.skenc"), encrypt("three", "Some-Other-Pass-3#").unwrap()).unwrap();

    let (mut session, _clock) = session_with(SessionConfig::default());
    let result = session.change_password(&store, MASTER, NEW_MASTER);

    match result {
        Err(SankryptError::PartialReencryption { success, failure, .. }) => {
            assert_eq!(success, 2);
            assert_eq!(failure, 1);
        }
        other => panic!("expected partial re-encryption, got {:?}", other),
    }
    for (name, text) in [("a.md.skenc", "one"), ("b.md.skenc", "two")] {
        let package = store.read(Path::new(name)).unwrap();
        assert_eq!(decrypt(&package, NEW_MASTER).unwrap(), text);
    }
    assert!(session.is_unlocked());
}

#[test]
fn test_single_scope_lockout_across_artifacts() {
    let (dir, store) = vault();
    fs::write(dir.path().join("a.skenc"), encrypt("a", MASTER).unwrap()).unwrap();
    fs::write(dir.path().join("b.skenc"), encrypt("b", MASTER).unwrap()).unwrap();

    let config = SessionConfig {
        lockout: LockoutPolicy {
            scope: LockoutScope::Single,
            ..LockoutPolicy::default()
        },
        ..SessionConfig::default()
    };
    let (mut session, clock) = session_with(config);

    for path in ["a.skenc", "b.skenc"] {
        let prompter = ScriptedPrompter::new(["nope-1", "nope-2", "nope-3"]);
        let result = session.decrypt_artifact(&store, &prompter, Path::new(path));
        assert!(matches!(result, Err(SankryptError::LockedOut { .. })));
    }

    assert!(!session.is_blocked(Path::new("a.skenc")).blocked);
    let status = session.is_blocked(Path::new("b.skenc"));
    assert!(status.blocked);

    clock.advance(Duration::from_secs(status.remaining_seconds));
    assert!(!session.is_blocked(Path::new("b.skenc")).blocked);
}

#[test]
fn test_cancelled_decrypt_changes_nothing() {
    let (dir, store) = vault();
    fs::write(dir.path().join("a.md.skenc"), encrypt("a", MASTER).unwrap()).unwrap();

    let (mut session, _clock) = session_with(SessionConfig::default());
    let prompter = ScriptedPrompter::default().then_cancel();

    let outcome = session
        .decrypt_file(&store, &prompter, Path::new("a.md.skenc"))
        .unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert!(!session.is_unlocked());
    assert_eq!(session.lockout().failures(Path::new("a.md.skenc")), 0);
    let names: Vec<PathBuf> = store.list().unwrap().into_iter().map(|m| m.path).collect();
    assert_eq!(names, vec![PathBuf::from("a.md.skenc")]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(4))]

    #[test]
    fn prop_round_trip_any_text(text in "\\PC{0,64}") {
        let package = encrypt(&text, MASTER).unwrap();
        prop_assert_eq!(decrypt(&package, MASTER).unwrap(), text);
    }
}

proptest! {
    #[test]
    fn prop_strength_is_bounded(password in ".{0,40}") {
        prop_assert!(score_strength(&password) <= 100);
    }

    #[test]
    fn prop_appending_a_new_class_never_lowers_length_score(base in "[a-z]{12,20}") {
        let longer = format!("{}A1!", base);
        prop_assert!(score_strength(&longer) >= score_strength(&base));
    }
}
