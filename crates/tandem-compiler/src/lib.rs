//! Concurrent client/server build orchestration.
//!
//! A [`CompilerSession`] owns one asset compiler and one server compiler, runs
//! both for every build, hands the manifest from the first to the second
//! through a shared [`ChannelSet`], and merges both results into one
//! [`BuildOutcome`](tandem_core::BuildOutcome).

/// Shared holder of the per-build channels.
pub mod channels;
/// Orchestrating build session.
pub mod session;
/// Contracts of the asset and server compilers.
pub mod traits;

pub use channels::ChannelSet;
pub use session::CompilerSession;
pub use traits::{AssetCompiler, ServerCompiler, Toolchain};
