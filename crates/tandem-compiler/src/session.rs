use std::sync::Arc;
use std::time::Instant;

use tandem_core::{BuildConfig, BuildErrors, BuildOutcome, CompileOptions, Result};
use tracing::Instrument as _;

use crate::channels::ChannelSet;
use crate::traits::{AssetCompiler, ServerCompiler, Toolchain};

/// Live pairing of an asset compiler and a server compiler.
///
/// Both compilers are created once and share one [`ChannelSet`]. Every
/// [`compile`](Self::compile) runs them concurrently against a fresh manifest
/// channel; [`dispose`](Self::dispose) consumes the session.
pub struct CompilerSession<A, S> {
    config: BuildConfig,
    options: CompileOptions,
    channels: Arc<ChannelSet>,
    assets: A,
    server: S,
    builds_started: u64,
}

impl<A: AssetCompiler, S: ServerCompiler> CompilerSession<A, S> {
    /// Creates the channel holder, then the asset and server compilers.
    ///
    /// # Errors
    /// Returns the toolchain's error if either compiler cannot be created.
    pub async fn create<T>(
        config: BuildConfig,
        options: CompileOptions,
        toolchain: &T,
    ) -> Result<Self>
    where
        T: Toolchain<Assets = A, Server = S>,
    {
        let channels = Arc::new(ChannelSet::new());

        let assets = toolchain
            .create_assets(&config, &options, Arc::clone(&channels))
            .await
            .inspect_err(|error| tracing::error!("Failed to create asset compiler: {error}"))?;
        let server = toolchain
            .create_server(&config, &options, Arc::clone(&channels))
            .await
            .inspect_err(|error| tracing::error!("Failed to create server compiler: {error}"))?;

        tracing::info!(
            "Created compiler session ({} + {}, mode: {})",
            assets.name(),
            server.name(),
            options.mode
        );

        Ok(Self {
            config,
            options,
            channels,
            assets,
            server,
            builds_started: 0,
        })
    }

    /// Runs one build of both targets.
    ///
    /// Both compilers always run to completion; a failure of one never cuts
    /// the other short. On success the asset compiler's manifest is returned.
    /// On failure every compiler that failed has its slot filled.
    ///
    /// # Errors
    /// Returns [`BuildErrors`] holding the failure of each compiler that failed.
    pub async fn compile(&mut self) -> BuildOutcome {
        self.builds_started += 1;
        let span = tracing::info_span!("build", number = self.builds_started);
        self.compile_once().instrument(span).await
    }

    async fn compile_once(&mut self) -> BuildOutcome {
        let start = Instant::now();
        self.channels.reset_manifest();

        let (assets, server) = tokio::join!(self.assets.compile(), self.server.compile());
        let elapsed_ms: u64 = start.elapsed().as_millis().try_into().unwrap_or(u64::MAX);

        match (assets, server) {
            (Ok(manifest), Ok(())) => {
                tracing::info!(
                    "Build succeeded in {elapsed_ms}ms ({} routes, version {})",
                    manifest.routes.len(),
                    manifest.version
                );
                Ok(manifest)
            }
            (assets, server) => {
                let errors = BuildErrors::new(assets.err(), server.err());
                tracing::warn!(
                    "Build failed in {elapsed_ms}ms (assets failed: {}, server failed: {})",
                    errors.assets_failed(),
                    errors.server_failed()
                );
                tracing::debug!("{errors}");
                Err(errors)
            }
        }
    }

    /// Releases both compilers, waiting for the slower of the two.
    pub async fn dispose(mut self) {
        tokio::join!(self.assets.dispose(), self.server.dispose());
        tracing::info!(
            "Disposed compiler session after {} builds",
            self.builds_started
        );
    }

    /// Configuration passed to both compilers.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Options passed to both compilers.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Channel holder shared with both compilers.
    pub fn channels(&self) -> &Arc<ChannelSet> {
        &self.channels
    }

    /// Number of times [`compile`](Self::compile) has been called.
    pub fn builds_started(&self) -> u64 {
        self.builds_started
    }
}
