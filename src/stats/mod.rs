//! Statistics for mirroring sessions
//!
//! Counters are shared between the session task and the controller, so
//! they are atomics behind an `Arc` rather than plain fields. Readers
//! take a [`StatsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one session
///
/// Updated by the session task, readable from any thread.
#[derive(Debug, Default)]
pub struct SessionStats {
    bytes_received: AtomicU64,
    chunks_received: AtomicU64,
    units_fed: AtomicU64,
    units_dropped: AtomicU64,
    frames_rendered: AtomicU64,
    decoder_errors: AtomicU64,
}

impl SessionStats {
    /// Create a new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one transport chunk of `len` bytes
    pub fn record_chunk(&self, len: usize) {
        self.chunks_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(len as u64, Ordering::Relaxed);
    }

    /// Record an access unit submitted to the decoder
    pub fn record_unit_fed(&self) {
        self.units_fed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an access unit dropped because no input buffer was free
    pub fn record_unit_dropped(&self) {
        self.units_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decoded frame released for rendering
    pub fn record_frame_rendered(&self) {
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a non-fatal decoder error
    pub fn record_decoder_error(&self) {
        self.decoder_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent-enough snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            chunks_received: self.chunks_received.load(Ordering::Relaxed),
            units_fed: self.units_fed.load(Ordering::Relaxed),
            units_dropped: self.units_dropped.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            decoder_errors: self.decoder_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Total bytes read from the video channel
    pub bytes_received: u64,
    /// Transport chunks read
    pub chunks_received: u64,
    /// Access units submitted to the decoder
    pub units_fed: u64,
    /// Access units dropped (no input buffer free)
    pub units_dropped: u64,
    /// Decoded frames released for rendering
    pub frames_rendered: u64,
    /// Non-fatal decoder errors
    pub decoder_errors: u64,
}
