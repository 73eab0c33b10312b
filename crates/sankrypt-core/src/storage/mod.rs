//! Artifact storage abstractions.
//!
//! - **traits**: the `ArtifactStore` contract the session depends on
//! - **types**: artifact metadata and the encrypted-file suffix
//! - **fs_store**: directory-backed store with atomic writes
//! - **memory**: in-memory store

mod fs_store;
mod memory;
pub mod traits;
pub mod types;

pub use fs_store::FsStore;
pub use memory::MemoryStore;
pub use traits::ArtifactStore;
pub use types::{is_encrypted_path, ArtifactMeta, ENCRYPTED_EXTENSION};
