//! Decoder abstraction
//!
//! The actual video decoder is a platform resource (typically a
//! hardware codec) with a buffer-queue interface: the caller borrows an
//! input buffer slot, fills it, submits it, and separately polls the
//! output side for decoded frames to release toward the surface. This
//! trait captures that shape without committing to any platform.

use std::time::Duration;

use crate::error::Result;

/// Index of a decoder input or output buffer slot
pub type BufferIndex = usize;

/// Buffer-queue style video decoder
///
/// Implementations wrap a real codec bound to an output surface at
/// creation time. All methods use short bounded waits at most; none may
/// block indefinitely.
pub trait Decoder: Send {
    /// Wait up to `timeout` for a free input buffer slot.
    ///
    /// `Ok(None)` means no slot freed up in time; the caller decides
    /// what to do with the data it wanted to submit.
    fn dequeue_input(&mut self, timeout: Duration) -> Result<Option<BufferIndex>>;

    /// Copy `data` into the slot and submit it for decoding.
    ///
    /// `pts_us` is the presentation timestamp in microseconds. The
    /// mirroring pipeline renders in receive order and always passes 0.
    fn queue_input(&mut self, index: BufferIndex, data: &[u8], pts_us: u64) -> Result<()>;

    /// Poll for a decoded output buffer without blocking.
    fn dequeue_output(&mut self) -> Result<Option<BufferIndex>>;

    /// Release an output buffer, rendering it to the surface if `render`.
    fn release_output(&mut self, index: BufferIndex, render: bool) -> Result<()>;
}
