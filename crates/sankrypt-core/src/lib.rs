//! # Sankrypt Core
//!
//! Single-master-password encryption for text artifacts.
//!
//! This crate holds the codec and the session logic independent of any
//! particular host. A host supplies an [`ArtifactStore`] and a [`Prompter`];
//! the [`Session`] does the rest.
//!
//! ## Architecture
//!
//! - **crypto**: PBKDF2 key derivation, AES-256-GCM packages, password policy
//! - **naming**: collision-free output paths
//! - **lockout**: failed-attempt tracking and timed lockout
//! - **consistency**: checks that one password opens many artifacts
//! - **session**: lock state, unlock flows, password change
//! - **autolock**: background idle check
//! - **storage**: artifact store contract with filesystem and memory backends
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use sankrypt_core::{FsStore, ScriptedPrompter, Session, SessionConfig};
//!
//! let store = FsStore::open("/home/me/notes").unwrap();
//! let prompter = ScriptedPrompter::new(["Correct-Horse-42!"]);
//! let mut session = Session::new(SessionConfig::default());
//! session
//!     .encrypt_file(&store, &prompter, Path::new("diary.md"), None)
//!     .unwrap();
//! ```

pub mod autolock;
pub mod clock;
pub mod consistency;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod lockout;
pub mod naming;
pub mod prompt;
pub mod session;
pub mod storage;

pub use autolock::AutoLockTimer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use consistency::{check_consistency, ConsistencyReport, ConsistencyWarning};
pub use crypto::{decrypt, encrypt, score_strength, validate_password, PasswordReport};
pub use error::{Result, SankryptError};
pub use lockout::{BlockStatus, LockoutGuard, LockoutPolicy, LockoutScope};
pub use naming::{resolve_target_path, NameOperation, ResolvedPath};
pub use prompt::{Notice, PasswordPrompt, Prompter, Question, ScriptedPrompter};
pub use session::{
    Decrypted, FileReport, OriginalAction, Outcome, ReencryptionReport, Session, SessionConfig,
    SessionObserver, SessionStatus,
};
pub use storage::{ArtifactMeta, ArtifactStore, FsStore, MemoryStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
