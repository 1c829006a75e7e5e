use core::result::Result as StdResult;
use std::sync::Arc;

use async_trait::async_trait;
use tandem_core::{AssetErrors, BuildConfig, CompileError, CompileOptions, Manifest, Result};

use crate::channels::ChannelSet;

/// Compiler producing the client bundles and the build manifest.
#[async_trait]
pub trait AssetCompiler: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Builds the client bundles.
    ///
    /// On success the compiler must publish the returned manifest on the
    /// current [`ChannelSet::manifest`] channel. On failure it should reject
    /// that channel so a waiting server compiler is released.
    ///
    /// # Errors
    ///
    /// Returns the stylesheet and script failures; either may be absent.
    async fn compile(&mut self) -> StdResult<Manifest, AssetErrors>;

    /// Releases watchers, caches and worker processes.
    async fn dispose(&mut self);
}

/// Compiler producing the server bundle.
#[async_trait]
pub trait ServerCompiler: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Builds the server bundle, reading the manifest from the current
    /// [`ChannelSet::manifest`] channel. Output is written as a side effect.
    ///
    /// # Errors
    ///
    /// Returns the server build failure.
    async fn compile(&mut self) -> StdResult<(), CompileError>;

    /// Releases watchers, caches and worker processes.
    async fn dispose(&mut self);
}

/// Creates the two compilers of a session.
///
/// Both constructors receive the same channel holder; they must keep the
/// `Arc` rather than the channel it currently holds.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Asset compiler type
    type Assets: AssetCompiler;
    /// Server compiler type
    type Server: ServerCompiler;

    /// Creates the asset compiler.
    ///
    /// # Errors
    ///
    /// Returns an error if the compiler cannot be set up.
    async fn create_assets(
        &self,
        config: &BuildConfig,
        options: &CompileOptions,
        channels: Arc<ChannelSet>,
    ) -> Result<Self::Assets>;

    /// Creates the server compiler.
    ///
    /// # Errors
    ///
    /// Returns an error if the compiler cannot be set up.
    async fn create_server(
        &self,
        config: &BuildConfig,
        options: &CompileOptions,
        channels: Arc<ChannelSet>,
    ) -> Result<Self::Server>;
}
