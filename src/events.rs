//! Cross-thread push delivery.
//!
//! Platform callbacks (sensor listeners, broadcast receivers, location
//! callbacks, prompt results) fire on delivery threads the host controls.
//! They never touch the snapshot directly; they enqueue a [`PushEvent`]
//! through a [`PushSender`], and the owner thread drains the queue.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ Sensor thread    │────▶│              │     │                  │
//! │ Broadcast thread │────▶│  PushQueue   │────▶│  Owner thread    │
//! │ Location thread  │────▶│  (bounded)   │     │  (synchronizer)  │
//! │ Prompt callback  │────▶│              │     │                  │
//! └──────────────────┘     └──────────────┘     └──────────────────┘
//! ```
//!
//! ## Epochs
//!
//! Every activation opens a new epoch and every envelope carries the epoch
//! of the sender that produced it.  Closing the queue sets the open epoch
//! to zero: senders refuse new events, and envelopes from an old epoch that
//! are still in flight are discarded on drain.  Nothing delivered after
//! teardown can reach the snapshot.

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::events::PushEvent;

/// Maximum number of pending push events.
pub const PUSH_QUEUE_DEPTH: usize = 32;

/// Epoch value meaning "no activation is open".
const CLOSED: u32 = 0;

struct Envelope {
    epoch: u32,
    event: PushEvent,
}

struct Shared {
    channel: Channel<CriticalSectionRawMutex, Envelope, PUSH_QUEUE_DEPTH>,
    open_epoch: AtomicU32,
    dropped: AtomicU32,
}

// ── Producer half ─────────────────────────────────────────────

/// Cloneable, thread-safe handle that delivery threads push through.
#[derive(Clone)]
pub struct PushSender {
    shared: Arc<Shared>,
    epoch: u32,
}

impl PushSender {
    /// Enqueue an event.  Safe to call from any thread.
    ///
    /// Returns `false` if the sender's activation has ended or the queue is
    /// full (event dropped).
    pub fn push(&self, event: PushEvent) -> bool {
        if !self.is_live() {
            return false;
        }
        match self.shared.channel.try_send(Envelope {
            epoch: self.epoch,
            event,
        }) {
            Ok(()) => true,
            Err(_) => {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Whether the activation this sender belongs to is still open.
    pub fn is_live(&self) -> bool {
        self.epoch != CLOSED && self.shared.open_epoch.load(Ordering::Acquire) == self.epoch
    }
}

impl core::fmt::Debug for PushSender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PushSender")
            .field("epoch", &self.epoch)
            .field("live", &self.is_live())
            .finish()
    }
}

// ── Consumer half ─────────────────────────────────────────────

/// Owner-thread side of the push queue.
pub struct PushQueue {
    shared: Arc<Shared>,
    last_epoch: u32,
}

impl PushQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                channel: Channel::new(),
                open_epoch: AtomicU32::new(CLOSED),
                dropped: AtomicU32::new(0),
            }),
            last_epoch: CLOSED,
        }
    }

    /// Start a new epoch and return its sender.
    pub fn open(&mut self) -> PushSender {
        let next = self.last_epoch.wrapping_add(1);
        self.last_epoch = if next == CLOSED { 1 } else { next };
        self.shared
            .open_epoch
            .store(self.last_epoch, Ordering::Release);
        self.sender()
    }

    /// End the current epoch and discard everything still queued.
    /// Returns the number of discarded events.
    pub fn close(&mut self) -> usize {
        self.shared.open_epoch.store(CLOSED, Ordering::Release);
        let mut discarded = 0;
        while self.shared.channel.try_receive().is_ok() {
            discarded += 1;
        }
        discarded
    }

    /// A sender for the current epoch.  When the queue is closed the
    /// returned sender is already dead and drops everything.
    pub fn sender(&self) -> PushSender {
        PushSender {
            shared: Arc::clone(&self.shared),
            epoch: self.shared.open_epoch.load(Ordering::Acquire),
        }
    }

    /// Hand queued events of the open epoch to `handler`, in FIFO order.
    ///
    /// At most one queue's worth is processed per call so a fast producer
    /// cannot starve the owner thread.  Returns the number of events handed
    /// over; stale envelopes are discarded without counting.
    pub fn drain(&self, mut handler: impl FnMut(PushEvent)) -> usize {
        let open = self.shared.open_epoch.load(Ordering::Acquire);
        let mut handled = 0;
        for _ in 0..PUSH_QUEUE_DEPTH {
            let Ok(envelope) = self.shared.channel.try_receive() else {
                break;
            };
            if open == CLOSED || envelope.epoch != open {
                continue;
            }
            handler(envelope.event);
            handled += 1;
        }
        handled
    }

    /// Number of events dropped because the queue was full.  Resets the
    /// counter and logs when non-zero.
    pub fn take_dropped(&self) -> u32 {
        let dropped = self.shared.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!("push queue overflow: {} events dropped", dropped);
        }
        dropped
    }

    /// Number of envelopes currently queued (any epoch).
    pub fn len(&self) -> usize {
        self.shared.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.channel.is_empty()
    }
}

impl Default for PushQueue {
    fn default() -> Self {
        Self::new()
    }
}
