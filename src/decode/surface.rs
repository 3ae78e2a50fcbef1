//! Output surface and decoder construction
//!
//! The rendering side owns the texture registry; the core only needs an
//! opaque handle it can size, hand to the decoder, and release. The
//! [`DecoderBackend`] collaborator creates both the surface and the
//! decoder bound to it, so the core never touches platform APIs.

use crate::decode::codec::Decoder;
use crate::error::Result;

/// Opaque renderable target, sized to the remote device's resolution
#[derive(Debug)]
pub struct Surface {
    /// Identifier the embedding UI uses to display this surface
    pub texture_id: i64,
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
}

/// Factory for surfaces and the decoders bound to them
///
/// One backend outlives many sessions; each `start()` asks it for a
/// fresh surface/decoder pair and each `stop()` gives the surface back.
pub trait DecoderBackend: Send + Sync {
    /// Create an output surface of the given size
    fn create_surface(&self, width: u32, height: u32) -> Result<Surface>;

    /// Create a decoder configured for and bound to `surface`
    fn create_decoder(&self, surface: &Surface) -> Result<Box<dyn Decoder>>;

    /// Release a surface created by this backend
    fn release_surface(&self, surface: Surface);
}
