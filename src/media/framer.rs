//! Annex-B byte stream framing
//!
//! The video channel delivers a raw H.264 Annex-B byte stream: access
//! units delimited solely by the 4-byte start code `00 00 00 01`, with
//! no length prefixes and no alignment between transport chunks and
//! unit boundaries. The framer accumulates incoming chunks and slices
//! out complete access units as soon as the *next* start code appears.
//!
//! ```text
//! [header junk] 00 00 00 01 <unit 0> 00 00 00 01 <unit 1> ...
//!               `-------- yielded --'
//! ```
//!
//! The bytes before the first start code are a stream header emitted by
//! the remote server process; they are not decodable and are discarded.
//! Each yielded unit starts with its own start code, which is the form
//! Annex-B decoders expect.

use bytes::{Bytes, BytesMut};

/// Annex-B start code delimiting access units
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// Default cap on accumulated bytes while still looking for the first
/// start code. A conforming stream puts a start code within the first
/// few dozen bytes; hitting this cap means the stream is not Annex-B.
pub const DEFAULT_SEEK_CEILING: usize = 100_000;

/// Framer scan state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingState {
    /// Still looking for the first start code; everything seen so far
    /// is header/garbage prefix.
    Seeking,
    /// Accumulator begins with a start code; scanning for the next one.
    Framing,
}

/// Incremental splitter from byte chunks to access units
///
/// Pure state machine, no I/O. Feed it chunks of any size (including
/// single bytes) with [`ingest`](ByteStreamFramer::ingest); the yielded
/// units are identical regardless of how the stream was chunked.
#[derive(Debug)]
pub struct ByteStreamFramer {
    acc: BytesMut,
    state: FramingState,
    seek_ceiling: usize,
}

impl Default for ByteStreamFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStreamFramer {
    /// Create a framer with the default seek ceiling
    pub fn new() -> Self {
        Self::with_seek_ceiling(DEFAULT_SEEK_CEILING)
    }

    /// Create a framer with a custom seek ceiling
    pub fn with_seek_ceiling(seek_ceiling: usize) -> Self {
        Self {
            acc: BytesMut::with_capacity(64 * 1024),
            state: FramingState::Seeking,
            seek_ceiling,
        }
    }

    /// Current scan state
    pub fn state(&self) -> FramingState {
        self.state
    }

    /// Bytes held for the in-progress unit (or unscanned prefix)
    pub fn pending_len(&self) -> usize {
        self.acc.len()
    }

    /// Ingest one transport chunk, yielding all units it completes.
    ///
    /// A unit is complete only once the start code *after* it has been
    /// seen, so the final unit of a stream stays pending until
    /// [`flush`](ByteStreamFramer::flush). A single chunk may complete
    /// zero, one, or many units.
    pub fn ingest(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.acc.extend_from_slice(chunk);

        if self.state == FramingState::Seeking {
            match find_start_code(&self.acc, 0) {
                Some(first) => {
                    // Drop the pre-stream header, keep from the marker on.
                    let _ = self.acc.split_to(first);
                    self.state = FramingState::Framing;
                }
                None => {
                    if self.acc.len() > self.seek_ceiling {
                        tracing::warn!(
                            accumulated = self.acc.len(),
                            "no start code within seek ceiling, resetting accumulator"
                        );
                        self.acc.clear();
                    }
                    return Vec::new();
                }
            }
        }

        // Invariant here: acc starts with a start code. Slice off a unit
        // for every further start code found. Iterative on purpose: a
        // bursty chunk can hold dozens of units.
        let mut units = Vec::new();
        while let Some(next) = find_start_code(&self.acc, START_CODE.len()) {
            units.push(self.acc.split_to(next).freeze());
        }
        units
    }

    /// Yield the trailing unit at end of stream, if any.
    ///
    /// Only meaningful after the producer has closed the channel; the
    /// framer returns to `Seeking` afterwards.
    pub fn flush(&mut self) -> Option<Bytes> {
        let tail = match self.state {
            FramingState::Framing if !self.acc.is_empty() => {
                let len = self.acc.len();
                Some(self.acc.split_to(len).freeze())
            }
            _ => None,
        };
        self.acc.clear();
        self.state = FramingState::Seeking;
        tail
    }
}

/// Find the next start code at or after `from`, over the whole buffer
fn find_start_code(buf: &[u8], from: usize) -> Option<usize> {
    if buf.len() < from + START_CODE.len() {
        return None;
    }
    buf[from..]
        .windows(START_CODE.len())
        .position(|w| w == START_CODE)
        .map(|i| i + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SC: [u8; 4] = START_CODE;

    fn stream(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn test_single_unit_completed_by_next_marker() {
        let mut framer = ByteStreamFramer::new();

        // First chunk: one full unit, no closing marker yet.
        let units = framer.ingest(&stream(&[&SC, &[0xAA, 0xBB]]));
        assert!(units.is_empty());

        // Second chunk opens the next unit, completing the first.
        let units = framer.ingest(&stream(&[&SC, &[0xCC]]));
        assert_eq!(units.len(), 1);
        assert_eq!(&units[0][..], &stream(&[&SC, &[0xAA, 0xBB]])[..]);
    }

    #[test]
    fn test_header_prefix_never_yielded() {
        let mut framer = ByteStreamFramer::new();
        let data = stream(&[
            b"DEVICEHDR",
            &SC,
            &[0x10, 0x11],
            &SC,
            &[0x20],
            &SC,
            &[0x30],
        ]);
        let units = framer.ingest(&data);
        assert_eq!(units.len(), 2);
        for unit in &units {
            assert!(!unit.windows(9).any(|w| w == b"DEVICEHDR"));
            assert_eq!(&unit[..4], &SC);
        }
    }

    #[test]
    fn test_chunking_invariance_byte_at_a_time() {
        let data = stream(&[
            &[0x64, 0x65][..], // header prefix
            &SC,
            &[0x67, 0x42, 0x00],
            &SC,
            &[0x68, 0xEF],
            &SC,
            &[0x65, 0x88, 0x84, 0x00],
            &SC,
            &[0x41, 0x9A],
        ]);

        let mut one_shot = ByteStreamFramer::new();
        let mut expected = one_shot.ingest(&data);
        if let Some(tail) = one_shot.flush() {
            expected.push(tail);
        }

        let mut dribble = ByteStreamFramer::new();
        let mut got = Vec::new();
        for byte in &data {
            got.extend(dribble.ingest(std::slice::from_ref(byte)));
        }
        if let Some(tail) = dribble.flush() {
            got.push(tail);
        }

        assert_eq!(expected.len(), 4);
        assert_eq!(got, expected);
    }

    #[test]
    fn test_marker_split_across_chunk_boundary() {
        // Split the closing marker at every possible point.
        for split in 1..4 {
            let mut framer = ByteStreamFramer::new();
            let body = stream(&[&SC, &[0xAA, 0xBB, 0xCC]]);
            let closing = stream(&[&SC, &[0xDD]]);

            assert!(framer.ingest(&body).is_empty());
            let (a, b) = closing.split_at(split);
            assert!(framer.ingest(a).is_empty(), "split at {}", split);
            let units = framer.ingest(b);
            assert_eq!(units.len(), 1, "split at {}", split);
            assert_eq!(&units[0][..], &body[..]);
        }
    }

    #[test]
    fn test_units_are_not_resplittable() {
        let mut framer = ByteStreamFramer::new();
        let data = stream(&[&SC, &[1, 2, 3], &SC, &[4], &SC, &[5, 6], &SC, &[7]]);
        let units = framer.ingest(&data);
        assert_eq!(units.len(), 3);
        for unit in &units {
            assert_eq!(&unit[..4], &SC);
            // No start code anywhere past the leading one.
            assert!(find_start_code(unit, START_CODE.len()).is_none());
        }
    }

    #[test]
    fn test_many_units_in_one_chunk() {
        // The historical parser recursed once per unit; make sure a
        // burst of tiny units is handled flat.
        let mut data = Vec::new();
        for i in 0..5_000u32 {
            data.extend_from_slice(&SC);
            data.push(i as u8);
        }
        let mut framer = ByteStreamFramer::new();
        let units = framer.ingest(&data);
        assert_eq!(units.len(), 4_999);
    }

    #[test]
    fn test_zero_length_chunk_is_noop() {
        let mut framer = ByteStreamFramer::new();
        framer.ingest(&stream(&[&SC, &[0xAA]]));
        let before = framer.pending_len();
        assert!(framer.ingest(&[]).is_empty());
        assert_eq!(framer.pending_len(), before);
    }

    #[test]
    fn test_seek_ceiling_resets_then_recovers() {
        let mut framer = ByteStreamFramer::with_seek_ceiling(64);

        // Garbage with no marker blows past the ceiling.
        assert!(framer.ingest(&[0xFFu8; 100]).is_empty());
        assert_eq!(framer.pending_len(), 0);
        assert_eq!(framer.state(), FramingState::Seeking);

        // Valid input afterwards still frames correctly.
        let units = framer.ingest(&stream(&[&SC, &[0xAA], &SC, &[0xBB]]));
        assert_eq!(units.len(), 1);
        assert_eq!(&units[0][..], &stream(&[&SC, &[0xAA]])[..]);
    }

    #[test]
    fn test_flush_yields_trailing_unit() {
        let mut framer = ByteStreamFramer::new();
        let units = framer.ingest(&stream(&[&SC, &[0xAA], &SC, &[0xBB, 0xCC]]));
        assert_eq!(units.len(), 1);

        let tail = framer.flush().unwrap();
        assert_eq!(&tail[..], &stream(&[&SC, &[0xBB, 0xCC]])[..]);
        assert_eq!(framer.pending_len(), 0);
        assert_eq!(framer.state(), FramingState::Seeking);
    }

    #[test]
    fn test_flush_while_seeking_yields_nothing() {
        let mut framer = ByteStreamFramer::new();
        framer.ingest(b"junk with no marker");
        assert!(framer.flush().is_none());
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_marker_found_across_seek_to_framing_in_one_call() {
        // Header and two complete units arrive in a single chunk.
        let mut framer = ByteStreamFramer::new();
        let data = stream(&[b"hdr", &SC, &[0x01], &SC, &[0x02], &SC]);
        let units = framer.ingest(&data);
        assert_eq!(units.len(), 2);
        assert_eq!(&units[0][..], &stream(&[&SC, &[0x01]])[..]);
        assert_eq!(&units[1][..], &stream(&[&SC, &[0x02]])[..]);
    }
}
