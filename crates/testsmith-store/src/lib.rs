// ABOUTME: Filesystem storage for generated artifacts under a single home directory.
// ABOUTME: Re-exports the artifact store and its error type.

pub mod artifacts;

pub use artifacts::{ArtifactKind, ArtifactStore, StoreError};
