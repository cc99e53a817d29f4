//! Session events and the queue that carries them into the control loop.
//!
//! The WebSocket client runs its callbacks in its own ESP-IDF task. Those
//! callbacks never touch session state: they translate each transport
//! callback into an [`Event`] and push it here. The single control loop
//! drains the queue and feeds every event to
//! [`DeviceSession::handle`](crate::app::session::DeviceSession::handle).
//!
//! ```text
//! ┌──────────────┐  Event   ┌──────────────┐  Event   ┌───────────────┐
//! │ WS callback  │────────▶│  EventQueue  │────────▶│  Control loop │
//! │ (link task)  │         │  (bounded)   │         │  (consumer)   │
//! └──────────────┘         └──────────────┘         └───────┬───────┘
//!                                                   Ticker ─┘ TimerTick
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::error::LinkError;

/// Largest inbound text frame accepted.
pub const MAX_FRAME_LEN: usize = 512;

/// Pending events before new ones are dropped.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Inbound text frame, owned so it can cross the task boundary.
pub type Frame = heapless::String<MAX_FRAME_LEN>;

/// Everything that can drive the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ── Transport link ────────────────────────────────────
    /// Link established (fires again after every reconnect).
    Connected,
    /// Link lost; the link reconnects on its own.
    Disconnected,
    /// One inbound text frame.
    Text(Frame),
    /// Transport-level error; not a disconnect.
    Error(LinkError),
    Ping,
    Pong,

    // ── Scheduler ─────────────────────────────────────────
    /// Telemetry cadence tick.
    TimerTick,
}

impl Event {
    /// Wrap an inbound frame, or report it as too large.
    pub fn text(payload: &str) -> Self {
        match Frame::try_from(payload) {
            Ok(frame) => Self::Text(frame),
            Err(()) => Self::Error(LinkError::FrameTooLarge),
        }
    }
}

/// Bounded MPSC queue of [`Event`]s, safe to share as a `static`.
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue an event without blocking.
    /// Returns `false` if the queue is full (event dropped and counted).
    pub fn push(&self, event: Event) -> bool {
        if self.channel.try_send(event).is_ok() {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Dequeue the oldest event, if any.
    pub fn pop(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Hand every pending event to `handler`, oldest first.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Events lost to a full queue since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}
