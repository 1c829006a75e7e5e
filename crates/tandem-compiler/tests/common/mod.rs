//! Scripted asset and server compilers for session tests
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::tests_outside_test_module,
        reason = "Test allows"
    )
)]

use async_trait::async_trait;
use core::result::Result as StdResult;
use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tandem_compiler::{AssetCompiler, ChannelSet, ServerCompiler, Toolchain};
use tandem_core::{
    AssetErrors, BuildConfig, BuildTarget, Channel, CompileError, CompileOptions, Error,
    IgnoreLock as _, Manifest, Result, RouteManifestEntry,
};
use tokio::time::sleep;
use tracing_subscriber::{EnvFilter, fmt};

// ----------------------------------------------------------------------------
// Tracing initialization for tests
// ----------------------------------------------------------------------------

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests (idempotent).
/// Honors `RUST_LOG` if set, otherwise defaults to "debug".
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_owned());
        if fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_test_writer()
            .try_init()
            .is_err()
        {
            // tracing already initialized in this process
        }
    });
}

// ----------------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------------

/// Manifest with one route per path, ids derived from the paths.
pub fn manifest_with_routes(version: &str, paths: &[&str]) -> Manifest {
    paths.iter().fold(Manifest::new(version), |manifest, path| {
        let id = format!("routes{path}");
        let module = format!("/build/{id}.js");
        manifest.with_route(RouteManifestEntry::new(id, *path, module))
    })
}

/// What the asset compiler does on one build.
#[derive(Debug, Clone)]
pub enum AssetStep {
    /// Wait, publish the manifest, return it
    Publish {
        manifest: Manifest,
        delay: Duration,
    },
    /// Wait, reject the channel, return the errors
    Fail {
        errors: AssetErrors,
        delay: Duration,
    },
}

impl AssetStep {
    /// Publish immediately.
    pub fn publish(manifest: Manifest) -> Self {
        Self::Publish {
            manifest,
            delay: Duration::ZERO,
        }
    }

    /// Fail immediately.
    pub fn fail(errors: AssetErrors) -> Self {
        Self::Fail {
            errors,
            delay: Duration::ZERO,
        }
    }
}

/// What the server compiler does on one build.
#[derive(Debug, Clone)]
pub enum ServerStep {
    /// Wait, then read the manifest from the channel and succeed if it arrives
    ReadManifest { delay: Duration },
    /// Succeed without touching the channel
    Succeed,
    /// Fail without touching the channel
    Fail(CompileError),
    /// Read the manifest, then fail anyway
    ReadThenFail(CompileError),
}

impl ServerStep {
    /// Read the manifest right away.
    pub fn read() -> Self {
        Self::ReadManifest {
            delay: Duration::ZERO,
        }
    }
}

/// Everything the mocks observed, shared with the test body.
#[derive(Debug, Default)]
pub struct CallLog {
    /// Manifests the server compiler read, in build order
    pub manifests_read: Mutex<Vec<Manifest>>,
    /// Channel instances the server compiler saw, in build order
    pub channels_seen: Mutex<Vec<Arc<Channel<Manifest>>>>,
    /// Configs handed to the toolchain, assets first
    pub configs_seen: Mutex<Vec<(BuildTarget, BuildConfig, CompileOptions)>>,
    /// Number of asset compilers created
    pub assets_created: AtomicUsize,
    /// Number of server compilers created
    pub servers_created: AtomicUsize,
    /// Number of asset compile calls
    pub assets_compiles: AtomicUsize,
    /// Number of server compile calls
    pub server_compiles: AtomicUsize,
    /// Number of finished asset disposals
    pub assets_disposed: AtomicUsize,
    /// Number of finished server disposals
    pub server_disposed: AtomicUsize,
    /// Number of asset disposals that have begun
    pub assets_dispose_started: AtomicUsize,
    /// Number of server disposals that have begun
    pub server_dispose_started: AtomicUsize,
    /// Disposals that finished while the other compiler's disposal had begun
    pub disposals_overlapped: AtomicUsize,
}

impl CallLog {
    /// Manifests read so far.
    pub fn manifests_read(&self) -> Vec<Manifest> {
        self.manifests_read.lock_ignore_poison().clone()
    }

    /// Channel instances seen so far.
    pub fn channels_seen(&self) -> Vec<Arc<Channel<Manifest>>> {
        self.channels_seen.lock_ignore_poison().clone()
    }

    /// Reads a counter.
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Runs one disposal: marks it begun, waits, notes whether the other
    /// disposal had begun by then, and marks it finished.
    async fn dispose(
        &self,
        started: &AtomicUsize,
        other_started: &AtomicUsize,
        finished: &AtomicUsize,
        delay: Duration,
    ) {
        started.fetch_add(1, Ordering::SeqCst);
        sleep(delay).await;
        if other_started.load(Ordering::SeqCst) > 0 {
            self.disposals_overlapped.fetch_add(1, Ordering::SeqCst);
        }
        finished.fetch_add(1, Ordering::SeqCst);
    }
}

// ----------------------------------------------------------------------------
// Mock compilers
// ----------------------------------------------------------------------------

/// Asset compiler following a script, one step per build.
pub struct ScriptedAssets {
    steps: VecDeque<AssetStep>,
    channels: Arc<ChannelSet>,
    calls: Arc<CallLog>,
    dispose_delay: Duration,
}

#[async_trait]
impl AssetCompiler for ScriptedAssets {
    fn name(&self) -> &'static str {
        "scripted-assets"
    }

    async fn compile(&mut self) -> StdResult<Manifest, AssetErrors> {
        self.calls.assets_compiles.fetch_add(1, Ordering::SeqCst);
        let channel = self.channels.manifest();
        match self.steps.pop_front() {
            Some(AssetStep::Publish { manifest, delay }) => {
                sleep(delay).await;
                channel
                    .publish(manifest.clone())
                    .expect("fresh channel accepts a publish");
                Ok(manifest)
            }
            Some(AssetStep::Fail { errors, delay }) => {
                sleep(delay).await;
                channel
                    .reject("asset build failed")
                    .expect("fresh channel accepts a reject");
                Err(errors)
            }
            None => {
                channel
                    .reject("no scripted step")
                    .expect("fresh channel accepts a reject");
                Err(AssetErrors::js(CompileError::Other(
                    "no scripted asset step".to_owned(),
                )))
            }
        }
    }

    async fn dispose(&mut self) {
        let calls = &self.calls;
        calls
            .dispose(
                &calls.assets_dispose_started,
                &calls.server_dispose_started,
                &calls.assets_disposed,
                self.dispose_delay,
            )
            .await;
    }
}

/// Server compiler following a script, one step per build.
pub struct ScriptedServer {
    steps: VecDeque<ServerStep>,
    channels: Arc<ChannelSet>,
    calls: Arc<CallLog>,
    dispose_delay: Duration,
}

impl ScriptedServer {
    async fn read_manifest(&self) -> StdResult<(), CompileError> {
        let channel = self.channels.manifest();
        self.calls
            .channels_seen
            .lock_ignore_poison()
            .push(Arc::clone(&channel));
        let manifest = channel
            .wait()
            .await
            .map_err(CompileError::ManifestUnavailable)?;
        self.calls.manifests_read.lock_ignore_poison().push(manifest);
        Ok(())
    }
}

#[async_trait]
impl ServerCompiler for ScriptedServer {
    fn name(&self) -> &'static str {
        "scripted-server"
    }

    async fn compile(&mut self) -> StdResult<(), CompileError> {
        self.calls.server_compiles.fetch_add(1, Ordering::SeqCst);
        match self.steps.pop_front() {
            Some(ServerStep::ReadManifest { delay }) => {
                sleep(delay).await;
                self.read_manifest().await
            }
            Some(ServerStep::Succeed) => Ok(()),
            Some(ServerStep::Fail(error)) => Err(error),
            Some(ServerStep::ReadThenFail(error)) => {
                self.read_manifest().await?;
                Err(error)
            }
            None => Err(CompileError::Other("no scripted server step".to_owned())),
        }
    }

    async fn dispose(&mut self) {
        let calls = &self.calls;
        calls
            .dispose(
                &calls.server_dispose_started,
                &calls.assets_dispose_started,
                &calls.server_disposed,
                self.dispose_delay,
            )
            .await;
    }
}

// ----------------------------------------------------------------------------
// Toolchain
// ----------------------------------------------------------------------------

/// Creates scripted compilers; construction of either can be made to fail.
#[derive(Default)]
pub struct ScriptedToolchain {
    /// Per-build asset steps
    pub asset_steps: Vec<AssetStep>,
    /// Per-build server steps
    pub server_steps: Vec<ServerStep>,
    /// Shared observations
    pub calls: Arc<CallLog>,
    /// Make `create_assets` fail
    pub fail_assets_creation: bool,
    /// Make `create_server` fail
    pub fail_server_creation: bool,
    /// How long asset disposal takes
    pub assets_dispose_delay: Duration,
    /// How long server disposal takes
    pub server_dispose_delay: Duration,
}

impl ScriptedToolchain {
    /// Toolchain running the given steps.
    pub fn new(asset_steps: Vec<AssetStep>, server_steps: Vec<ServerStep>) -> Self {
        Self {
            asset_steps,
            server_steps,
            ..Self::default()
        }
    }

    fn record_config(&self, target: BuildTarget, config: &BuildConfig, options: &CompileOptions) {
        self.calls
            .configs_seen
            .lock_ignore_poison()
            .push((target, config.clone(), options.clone()));
    }
}

#[async_trait]
impl Toolchain for ScriptedToolchain {
    type Assets = ScriptedAssets;
    type Server = ScriptedServer;

    async fn create_assets(
        &self,
        config: &BuildConfig,
        options: &CompileOptions,
        channels: Arc<ChannelSet>,
    ) -> Result<ScriptedAssets> {
        self.record_config(BuildTarget::AssetsJs, config, options);
        if self.fail_assets_creation {
            return Err(Error::Construction {
                target: BuildTarget::AssetsJs,
                reason: "entry.client not found".to_owned(),
            });
        }
        self.calls.assets_created.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedAssets {
            steps: self.asset_steps.iter().cloned().collect(),
            channels,
            calls: Arc::clone(&self.calls),
            dispose_delay: self.assets_dispose_delay,
        })
    }

    async fn create_server(
        &self,
        config: &BuildConfig,
        options: &CompileOptions,
        channels: Arc<ChannelSet>,
    ) -> Result<ScriptedServer> {
        self.record_config(BuildTarget::Server, config, options);
        if self.fail_server_creation {
            return Err(Error::Construction {
                target: BuildTarget::Server,
                reason: "entry.server not found".to_owned(),
            });
        }
        self.calls.servers_created.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedServer {
            steps: self.server_steps.iter().cloned().collect(),
            channels,
            calls: Arc::clone(&self.calls),
            dispose_delay: self.server_dispose_delay,
        })
    }
}
