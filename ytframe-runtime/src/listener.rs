//! Bridges a widget's `onReady` / `onError` callbacks into one future.
//!
//! [`CreationListener`] is the event sink handed to the platform. The first
//! callback that can settle the creation wins: `onReady` registers the handle
//! and detaches the error listener, `onError` releases the reservation. Every
//! later callback is ignored.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use ytframe_core::{PageHost, PlaybackError, PlayerEventSink, PlayerKey, SharedPlayer};

use crate::error::EmbedError;
use crate::registry::{lock, SharedSlots, Slot};

type Outcome = Result<SharedPlayer, PlaybackError>;

enum Settlement {
    Waiting {
        /// `None` until the platform's constructor has returned.
        handle: Option<SharedPlayer>,
        /// `onReady` arrived before the handle did.
        ready_early: bool,
        respond_to: oneshot::Sender<Outcome>,
    },
    Settled,
}

pub(crate) struct CreationListener {
    key: PlayerKey,
    slots: SharedSlots,
    host: Arc<dyn PageHost>,
    settlement: Mutex<Settlement>,
}

impl CreationListener {
    pub(crate) fn new(
        key: PlayerKey,
        slots: SharedSlots,
        host: Arc<dyn PageHost>,
    ) -> (Arc<Self>, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let listener = Arc::new(Self {
            key,
            slots,
            host,
            settlement: Mutex::new(Settlement::Waiting {
                handle: None,
                ready_early: false,
                respond_to: tx,
            }),
        });
        (listener, rx)
    }

    /// Hand over the handle returned by the platform's constructor.
    pub(crate) fn attach(&self, player: SharedPlayer) {
        let mut settlement = lock(&self.settlement);

        if matches!(*settlement, Settlement::Settled) {
            // onError beat the constructor; the widget is already released.
            drop(settlement);
            player.destroy();
            return;
        }

        if matches!(*settlement, Settlement::Waiting { ready_early: false, .. }) {
            if let Settlement::Waiting { handle, .. } = &mut *settlement {
                *handle = Some(player);
            }
            return;
        }

        if let Settlement::Waiting { respond_to, .. } =
            std::mem::replace(&mut *settlement, Settlement::Settled)
        {
            drop(settlement);
            self.register(player, respond_to);
        }
    }

    /// Settle without an outcome and release the reservation. Used when the
    /// platform could not build the widget at all.
    pub(crate) fn cancel(&self) {
        let previous = std::mem::replace(&mut *lock(&self.settlement), Settlement::Settled);
        if let Settlement::Waiting { handle, .. } = previous {
            self.release(handle);
        }
    }

    fn register(&self, player: SharedPlayer, respond_to: oneshot::Sender<Outcome>) {
        lock(&self.slots).insert(self.key.clone(), Slot::Ready(Arc::clone(&player)));
        player.remove_error_listener();
        tracing::debug!(key = %self.key, "player ready and registered");
        let _ = respond_to.send(Ok(player));
    }

    fn release(&self, handle: Option<SharedPlayer>) {
        {
            let mut slots = lock(&self.slots);
            if matches!(slots.get(&self.key), Some(Slot::Pending)) {
                slots.remove(&self.key);
            }
        }
        if let Some(player) = handle {
            player.destroy();
        }
        self.host.remove_placeholder(&self.key.element_id());
    }
}

impl Drop for CreationListener {
    fn drop(&mut self) {
        // The platform let go of the sink without calling back.
        let settlement = self
            .settlement
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Settlement::Waiting { handle, .. } =
            std::mem::replace(settlement, Settlement::Settled)
        {
            tracing::warn!(key = %self.key, "widget callbacks dropped before the player settled");
            self.release(handle);
        }
    }
}

impl PlayerEventSink for CreationListener {
    fn on_ready(&self) {
        let mut settlement = lock(&self.settlement);
        match &mut *settlement {
            Settlement::Waiting { handle: Some(_), .. } => {}
            Settlement::Waiting {
                handle: None,
                ready_early,
                ..
            } => {
                *ready_early = true;
                return;
            }
            Settlement::Settled => {
                tracing::trace!(key = %self.key, "ignoring ready callback after settlement");
                return;
            }
        }

        if let Settlement::Waiting {
            handle: Some(player),
            respond_to,
            ..
        } = std::mem::replace(&mut *settlement, Settlement::Settled)
        {
            drop(settlement);
            self.register(player, respond_to);
        }
    }

    fn on_error(&self, code: i32) {
        let mut settlement = lock(&self.settlement);
        // A ready callback still waiting for its handle has already won.
        if !matches!(*settlement, Settlement::Waiting { ready_early: false, .. }) {
            tracing::trace!(key = %self.key, code, "ignoring error callback after settlement");
            return;
        }

        let previous = std::mem::replace(&mut *settlement, Settlement::Settled);
        drop(settlement);

        if let Settlement::Waiting {
            handle, respond_to, ..
        } = previous
        {
            let error = PlaybackError::from_code(code);
            tracing::debug!(key = %self.key, code, error = %error, "player failed before ready");
            self.release(handle);
            let _ = respond_to.send(Err(error));
        }
    }
}

/// A player creation in flight.
///
/// Resolves once with the ready handle or the mapped playback error.
///
/// The creation carries on without it: dropping the future does not cancel
/// anything, and a later `onReady` still registers the player.
#[must_use = "the ready handle and any playback error are only observed when awaited"]
pub struct PendingPlayer {
    key: PlayerKey,
    outcome: oneshot::Receiver<Outcome>,
}

impl PendingPlayer {
    pub(crate) fn new(key: PlayerKey, outcome: oneshot::Receiver<Outcome>) -> Self {
        Self { key, outcome }
    }

    pub fn key(&self) -> &PlayerKey {
        &self.key
    }
}

impl Future for PendingPlayer {
    type Output = Result<SharedPlayer, EmbedError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.outcome).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome.map_err(EmbedError::from)),
            // The platform dropped the sink without calling either callback.
            Poll::Ready(Err(_)) => Poll::Ready(Err(EmbedError::CallbacksDropped {
                key: this.key.clone(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl fmt::Debug for PendingPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPlayer").field("key", &self.key).finish()
    }
}
