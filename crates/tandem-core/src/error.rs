use core::fmt;
use core::result::Result as CoreResult;
use std::io::Error as IoError;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlDeError;
use toml::ser::Error as TomlSerError;

use crate::channel::ChannelError;
use crate::outcome::BuildTarget;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors raised outside a build: configuration, I/O and session construction.
///
/// Failures of a build itself are never reported through this type; they are
/// captured in [`BuildErrors`](crate::outcome::BuildErrors).
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    TomlParse(#[from] TomlDeError),

    /// TOML serialization failed.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] TomlSerError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A compiler could not be constructed for the session.
    #[error("Failed to create {target} compiler: {reason}")]
    Construction {
        /// Which compiler failed
        target: BuildTarget,
        /// Reason reported by the compiler
        reason: String,
    },
}

/// Position of a diagnostic inside a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Source file path, relative to the app directory
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 0-based column
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A single message emitted by a compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Message text
    pub message: String,
    /// Where the problem was found, if known
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Creates a diagnostic without a location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Attaches a source location.
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.location = Some(Location {
            file: file.into(),
            line,
            column,
        });
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Failure payload reported by a compiler for one build target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The compiler rejected the input.
    #[error("{}", join_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),

    /// The manifest never became available to the server compiler.
    #[error("Manifest unavailable: {0}")]
    ManifestUnavailable(ChannelError),

    /// Any other compiler failure.
    #[error("{0}")]
    Other(String),
}

impl CompileError {
    /// Creates a failure carrying a single diagnostic message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Diagnostics(vec![Diagnostic::new(message)])
    }

    /// Returns the diagnostics carried by this error, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Diagnostics(diagnostics) => diagnostics,
            Self::ManifestUnavailable(_) | Self::Other(_) => &[],
        }
    }
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
