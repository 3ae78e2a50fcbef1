//! Media handling
//!
//! This module provides:
//! - Annex-B byte stream framing (start-code splitting into access units)

pub mod framer;

pub use framer::{ByteStreamFramer, FramingState, DEFAULT_SEEK_CEILING, START_CODE};
