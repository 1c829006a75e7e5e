//! Merged outcome of one build across both compilers.

use core::error::Error as StdError;
use core::fmt;

use crate::error::CompileError;
use crate::manifest::Manifest;

/// Result of one `compile` call: the manifest, or every failure collected.
pub type BuildOutcome = Result<Manifest, BuildErrors>;

/// The failure slots a build can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildTarget {
    /// Client stylesheet bundle
    AssetsCss,
    /// Client script bundle
    AssetsJs,
    /// Server bundle
    Server,
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AssetsCss => "assets css",
            Self::AssetsJs => "assets js",
            Self::Server => "server",
        };
        f.write_str(name)
    }
}

/// Failure reported by the asset compiler. Either part may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetErrors {
    /// Stylesheet compilation failure
    pub css: Option<CompileError>,
    /// Script compilation failure
    pub js: Option<CompileError>,
}

impl AssetErrors {
    /// Failure of the stylesheet bundle only.
    pub fn css(error: CompileError) -> Self {
        Self {
            css: Some(error),
            js: None,
        }
    }

    /// Failure of the script bundle only.
    pub fn js(error: CompileError) -> Self {
        Self {
            css: None,
            js: Some(error),
        }
    }
}

/// Every failure collected from one build.
///
/// Slots are filled only for the compilers that failed; an empty slot means
/// that compiler succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildErrors {
    assets: Option<AssetErrors>,
    server: Option<CompileError>,
}

impl BuildErrors {
    /// Merges the failures of one build. `None` means that compiler succeeded.
    pub fn new(assets: Option<AssetErrors>, server: Option<CompileError>) -> Self {
        Self { assets, server }
    }

    /// Whether no compiler failed.
    pub fn is_empty(&self) -> bool {
        self.assets.is_none() && self.server.is_none()
    }

    /// Stylesheet failure from the asset compiler.
    pub fn assets_css(&self) -> Option<&CompileError> {
        self.assets.as_ref()?.css.as_ref()
    }

    /// Script failure from the asset compiler.
    pub fn assets_js(&self) -> Option<&CompileError> {
        self.assets.as_ref()?.js.as_ref()
    }

    /// Failure from the server compiler.
    pub fn server(&self) -> Option<&CompileError> {
        self.server.as_ref()
    }

    /// Whether the asset compiler reported failure, even without a payload.
    pub fn assets_failed(&self) -> bool {
        self.assets.is_some()
    }

    /// Whether the server compiler reported failure.
    pub fn server_failed(&self) -> bool {
        self.server.is_some()
    }

    /// Slots that carry an error, in a stable order.
    pub fn failed_targets(&self) -> Vec<BuildTarget> {
        let mut targets = Vec::with_capacity(3);
        if self.assets_css().is_some() {
            targets.push(BuildTarget::AssetsCss);
        }
        if self.assets_js().is_some() {
            targets.push(BuildTarget::AssetsJs);
        }
        if self.server.is_some() {
            targets.push(BuildTarget::Server);
        }
        targets
    }
}

impl fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Build failed")?;
        if self.assets_failed() && self.assets_css().is_none() && self.assets_js().is_none() {
            write!(f, "\n[assets] failed without details")?;
        }
        let slots = [
            (BuildTarget::AssetsCss, self.assets_css()),
            (BuildTarget::AssetsJs, self.assets_js()),
            (BuildTarget::Server, self.server()),
        ];
        for (target, error) in slots {
            if let Some(error) = error {
                write!(f, "\n[{target}] {error}")?;
            }
        }
        Ok(())
    }
}

impl StdError for BuildErrors {}
