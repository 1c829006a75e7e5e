//! Build configuration and per-session compile options.
//!
//! Both are handed unmodified to the asset and server compilers; the
//! orchestrator itself only loads and validates them.

use core::fmt;
use core::str::FromStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::{from_str, to_string_pretty};

use crate::error::{Error, Result};

/// Project layout shared by both compilers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Project root
    pub root_directory: PathBuf,
    /// Application sources, relative to the root
    pub app_directory: PathBuf,
    /// Where client bundles are written, relative to the root
    pub assets_build_directory: PathBuf,
    /// URL prefix client bundles are served under
    pub public_path: String,
    /// Where the server bundle is written, relative to the root
    pub server_build_path: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root_directory: PathBuf::from("."),
            app_directory: PathBuf::from("app"),
            assets_build_directory: PathBuf::from("public/build"),
            public_path: "/build/".to_owned(),
            server_build_path: PathBuf::from("build/index.js"),
        }
    }
}

impl BuildConfig {
    /// Load config from a TOML file. Missing keys take their default value.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or fails validation.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = from_str(&contents)?;
        config.validate()?;

        tracing::debug!(
            "Loaded build config from {:?}: app={:?}, public_path={}",
            path,
            config.app_directory,
            config.public_path
        );

        Ok(config)
    }

    /// Save config to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = to_string_pretty(self)?;
        let header = "# Tandem build configuration\n\
                      # Paths are relative to root_directory\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Checks the values both compilers rely on.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !self.public_path.starts_with('/') || !self.public_path.ends_with('/') {
            return Err(Error::Config(format!(
                "public_path must start and end with '/', got {:?}",
                self.public_path
            )));
        }

        let required = [
            ("app_directory", &self.app_directory),
            ("assets_build_directory", &self.assets_build_directory),
            ("server_build_path", &self.server_build_path),
        ];
        for (field, path) in required {
            if path.as_os_str().is_empty() {
                return Err(Error::Config(format!("{field} must not be empty")));
            }
        }

        Ok(())
    }

    /// Absolute-or-root-relative path of the app directory.
    pub fn app_path(&self) -> PathBuf {
        self.root_directory.join(&self.app_directory)
    }
}

/// Optimization profile of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Unminified output with development checks
    Development,
    /// Minified output
    #[default]
    Production,
    /// Output for test runners
    Test,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        };
        f.write_str(mode)
    }
}

impl FromStr for BuildMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(Error::Config(format!("Unknown build mode: {other}"))),
        }
    }
}

/// Options for every build of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Optimization profile
    pub mode: BuildMode,
    /// Whether to emit source maps
    pub sourcemap: bool,
}

impl CompileOptions {
    /// Options for the given mode, without source maps.
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            sourcemap: false,
        }
    }

    /// Enables or disables source maps.
    #[must_use]
    pub fn with_sourcemap(mut self, sourcemap: bool) -> Self {
        self.sourcemap = sourcemap;
        self
    }
}
