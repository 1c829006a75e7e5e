//! Core types for the tandem build orchestrator.
//!
//! This crate provides the build manifest model, the one-shot channel used to
//! hand the manifest between concurrently running compilers, the merged build
//! outcome, configuration, and error handling.

/// One-shot publish/wait channel.
pub mod channel;
/// Build configuration and compile options.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Build manifest produced by the asset compiler.
pub mod manifest;
/// Merged success/failure of one build.
pub mod outcome;
/// Lock helpers that ignore poisoning.
pub mod sync;

pub use channel::{Channel, ChannelError};
pub use config::{BuildConfig, BuildMode, CompileOptions};
pub use error::{CompileError, Diagnostic, Error, Location, Result};
pub use manifest::{EntryManifest, Manifest, RouteManifestEntry};
pub use outcome::{AssetErrors, BuildErrors, BuildOutcome, BuildTarget};
pub use sync::{IgnoreLock, IgnoreRwLock};
