//! Decoding side of the pipeline
//!
//! This module provides:
//! - The [`Decoder`] buffer-queue abstraction over a platform codec
//! - The [`DecodeSink`] that feeds access units and drains outputs
//! - Surface and backend contracts for the rendering embedder

pub mod codec;
pub mod sink;
pub mod surface;

pub use codec::{BufferIndex, Decoder};
pub use sink::{DecodeSink, FeedOutcome, DEFAULT_INPUT_TIMEOUT, DEFAULT_MAX_DECODER_ERRORS};
pub use surface::{DecoderBackend, Surface};
