use std::sync::{Arc, RwLock};

use tandem_core::{Channel, IgnoreRwLock as _, Manifest};

/// Channels shared by the compilers of one session.
///
/// The holder is shared, the channels inside are not: each build swaps in a
/// fresh channel, so values from an earlier build are unreachable through
/// the holder.
#[derive(Debug)]
pub struct ChannelSet {
    manifest: RwLock<Arc<Channel<Manifest>>>,
}

impl ChannelSet {
    /// Creates a holder with a pending manifest channel.
    pub fn new() -> Self {
        Self {
            manifest: RwLock::new(Arc::new(Channel::new())),
        }
    }

    /// The manifest channel of the current build.
    pub fn manifest(&self) -> Arc<Channel<Manifest>> {
        Arc::clone(&*self.manifest.read_ignore_poison())
    }

    /// Replaces the manifest channel with a fresh pending one and returns it.
    ///
    /// Holders of the previous channel keep it; it is no longer reachable
    /// through this set.
    pub fn reset_manifest(&self) -> Arc<Channel<Manifest>> {
        let fresh = Arc::new(Channel::new());
        *self.manifest.write_ignore_poison() = Arc::clone(&fresh);
        fresh
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}
