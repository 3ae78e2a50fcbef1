//! mirror-rs: remote screen mirroring client core
//!
//! Streams a remote device's screen as a raw Annex-B H.264 byte stream,
//! reconstructs access units incrementally, and feeds them to a
//! platform decoder bound to an output surface.
//!
//! Pipeline:
//! ```text
//! transport bytes -> ByteStreamFramer -> access units -> DecodeSink -> surface
//! ```
//!
//! The embedder supplies the platform pieces through three traits:
//! [`DeviceLink`] (authenticated channel to the device),
//! [`DecoderBackend`] (surfaces and decoders), and [`Decoder`] (the
//! codec's buffer queues). [`SessionController`] ties them together:
//!
//! ```no_run
//! use std::sync::Arc;
//! use mirror_rs::{SessionConfig, SessionController, TransportKind};
//!
//! # async fn example(
//! #     backend: Arc<dyn mirror_rs::DecoderBackend>,
//! #     link: Arc<dyn mirror_rs::DeviceLink>,
//! # ) -> mirror_rs::Result<()> {
//! let mut controller = SessionController::new(backend, link);
//! let texture_id = controller
//!     .start(
//!         TransportKind::RemoteSpawn { command: "mirror-server --max-size 1920".into() },
//!         SessionConfig::with_resolution(1920, 1080),
//!     )
//!     .await?;
//! // ... display texture_id, later:
//! controller.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod error;
pub mod media;
pub mod session;
pub mod stats;

pub use decode::{BufferIndex, DecodeSink, Decoder, DecoderBackend, FeedOutcome, Surface};
pub use error::{Error, Result};
pub use media::{ByteStreamFramer, FramingState, START_CODE};
pub use session::{
    BoxFuture, ByteStream, DeviceLink, SessionConfig, SessionController, Transport, TransportKind,
};
pub use stats::{SessionStats, StatsSnapshot};
