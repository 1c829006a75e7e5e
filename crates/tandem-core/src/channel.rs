//! One-shot channel handing a single value between concurrently running tasks.
//!
//! A channel starts `Pending` and settles exactly once:
//! - Pending → Fulfilled (a value was published)
//! - Pending → Rejected (the producer gave up)
//!
//! Once settled the state is final. Any number of readers may wait on the same
//! channel; each receives a clone of the settled value, and readers arriving
//! after settlement return immediately.

use core::fmt;
use core::pin::pin;
use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::Notify;

use crate::sync::IgnoreLock as _;

/// Errors reported by channel operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The channel was already fulfilled or rejected; the first value is kept.
    #[error("Channel already settled")]
    AlreadySettled,

    /// The producer rejected the channel instead of publishing a value.
    #[error("Channel rejected: {0}")]
    Rejected(String),
}

enum ChannelState<T> {
    Pending,
    Fulfilled(T),
    Rejected(String),
}

/// Single-writer, multi-reader, single-use handoff of one value.
pub struct Channel<T> {
    state: Mutex<ChannelState<T>>,
    notify: Notify,
}

impl<T: Clone> Channel<T> {
    /// Creates a pending channel.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState::Pending),
            notify: Notify::new(),
        }
    }

    /// Fulfills the channel with `value` and wakes every waiting reader.
    ///
    /// # Errors
    /// Returns [`ChannelError::AlreadySettled`] if the channel was already
    /// fulfilled or rejected. The stored value is left untouched.
    pub fn publish(&self, value: T) -> Result<(), ChannelError> {
        self.settle(ChannelState::Fulfilled(value))
    }

    /// Rejects the channel so waiting readers stop waiting.
    ///
    /// # Errors
    /// Returns [`ChannelError::AlreadySettled`] if the channel was already
    /// fulfilled or rejected.
    pub fn reject(&self, reason: impl Into<String>) -> Result<(), ChannelError> {
        self.settle(ChannelState::Rejected(reason.into()))
    }

    /// Waits until the channel settles and returns a clone of its value.
    ///
    /// Does not consume the value. Returns without suspending when the channel
    /// is already settled.
    ///
    /// # Errors
    /// Returns [`ChannelError::Rejected`] if the producer rejected the channel.
    pub async fn wait(&self) -> Result<T, ChannelError> {
        loop {
            let mut notified = pin!(self.notify.notified());
            // Register before checking, so a publish in between still wakes us.
            notified.as_mut().enable();

            if let Some(settled) = self.try_get() {
                return settled;
            }

            notified.await;
        }
    }

    /// Returns the settled value without waiting, or `None` while pending.
    pub fn try_get(&self) -> Option<Result<T, ChannelError>> {
        match &*self.state.lock_ignore_poison() {
            ChannelState::Pending => None,
            ChannelState::Fulfilled(value) => Some(Ok(value.clone())),
            ChannelState::Rejected(reason) => Some(Err(ChannelError::Rejected(reason.clone()))),
        }
    }

    /// Whether the channel has been fulfilled or rejected.
    pub fn is_settled(&self) -> bool {
        !matches!(*self.state.lock_ignore_poison(), ChannelState::Pending)
    }

    fn settle(&self, next: ChannelState<T>) -> Result<(), ChannelError> {
        {
            let mut state = self.state.lock_ignore_poison();
            if !matches!(*state, ChannelState::Pending) {
                return Err(ChannelError::AlreadySettled);
            }
            *state = next;
        }
        self.notify.notify_waiters();
        Ok(())
    }
}

impl<T: Clone> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match *self.state.lock_ignore_poison() {
            ChannelState::Pending => "Pending",
            ChannelState::Fulfilled(_) => "Fulfilled",
            ChannelState::Rejected(_) => "Rejected",
        };
        f.debug_struct("Channel")
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
