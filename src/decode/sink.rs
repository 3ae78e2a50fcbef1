//! Decode sink
//!
//! Feeds access units into a [`Decoder`] and keeps its output side
//! drained. Live mirroring policy: if no input buffer frees up within a
//! short wait, the unit is dropped rather than stalling the transport —
//! a stale frame is worse than a missing one, and there is no
//! backpressure channel to the remote encoder anyway.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::decode::codec::Decoder;
use crate::error::{Error, Result};
use crate::stats::SessionStats;

/// Default wait for an input buffer slot
pub const DEFAULT_INPUT_TIMEOUT: Duration = Duration::from_millis(10);

/// Default consecutive decoder errors before the session is failed
pub const DEFAULT_MAX_DECODER_ERRORS: u32 = 3;

/// What happened to one access unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Unit was submitted to the decoder
    Submitted,
    /// Unit was dropped (no input buffer available in time)
    Dropped,
}

/// Bridge from access units to a decoder's buffer queues
pub struct DecodeSink {
    decoder: Box<dyn Decoder>,
    input_timeout: Duration,
    max_errors: u32,
    consecutive_errors: u32,
    stats: Arc<SessionStats>,
}

impl DecodeSink {
    /// Wrap a decoder with the given flow-control settings
    pub fn new(
        decoder: Box<dyn Decoder>,
        input_timeout: Duration,
        max_errors: u32,
        stats: Arc<SessionStats>,
    ) -> Self {
        Self {
            decoder,
            input_timeout,
            max_errors,
            consecutive_errors: 0,
            stats,
        }
    }

    /// Feed one access unit to the decoder, then drain its output side.
    ///
    /// A decoder error on a single unit is logged and absorbed; only
    /// `max_errors` consecutive failures escalate to a session-fatal
    /// [`Error::Decoder`]. A dropped unit is not an error.
    pub fn feed(&mut self, unit: &Bytes) -> Result<FeedOutcome> {
        match self.submit_and_drain(unit) {
            Ok(outcome) => {
                self.consecutive_errors = 0;
                Ok(outcome)
            }
            Err(e) => {
                self.consecutive_errors += 1;
                self.stats.record_decoder_error();
                tracing::error!(
                    error = %e,
                    consecutive = self.consecutive_errors,
                    "decoder error on access unit"
                );
                if self.consecutive_errors >= self.max_errors {
                    Err(Error::Decoder(format!(
                        "{} consecutive decoder errors, giving up",
                        self.consecutive_errors
                    )))
                } else {
                    Ok(FeedOutcome::Dropped)
                }
            }
        }
    }

    fn submit_and_drain(&mut self, unit: &Bytes) -> Result<FeedOutcome> {
        let outcome = match self.decoder.dequeue_input(self.input_timeout)? {
            Some(index) => {
                // Receive order drives rendering; PTS stays zero.
                self.decoder.queue_input(index, unit, 0)?;
                self.stats.record_unit_fed();
                FeedOutcome::Submitted
            }
            None => {
                self.stats.record_unit_dropped();
                tracing::warn!(len = unit.len(), "no input buffer available, dropping access unit");
                FeedOutcome::Dropped
            }
        };

        // Drain on every feed, submitted or not: an undrained output
        // queue eventually blocks all input submission.
        while let Some(index) = self.decoder.dequeue_output()? {
            self.decoder.release_output(index, true)?;
            self.stats.record_frame_rendered();
        }

        Ok(outcome)
    }
}
