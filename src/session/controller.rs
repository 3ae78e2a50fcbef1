//! Session controller
//!
//! Single public entry point for session control. Guarantees at most
//! one live session: `start()` awaits full teardown of any prior
//! session before it constructs the new surface, decoder, and task, so
//! two sessions can never race on the same resources.

use std::sync::Arc;

use crate::decode::{DecodeSink, DecoderBackend, Surface};
use crate::error::Result;
use crate::session::config::SessionConfig;
use crate::session::transport::{DeviceLink, Transport, TransportKind};
use crate::session::Session;
use crate::stats::{SessionStats, StatsSnapshot};

struct ActiveSession {
    session: Session,
    surface: Option<Surface>,
    stats: Arc<SessionStats>,
}

/// Owns the session lifecycle and the output surface
pub struct SessionController {
    backend: Arc<dyn DecoderBackend>,
    link: Arc<dyn DeviceLink>,
    active: Option<ActiveSession>,
}

impl SessionController {
    /// Create a controller over a decoder backend and a device link
    pub fn new(backend: Arc<dyn DecoderBackend>, link: Arc<dyn DeviceLink>) -> Self {
        Self {
            backend,
            link,
            active: None,
        }
    }

    /// Start a session, replacing any active one.
    ///
    /// Returns the texture id of the freshly created output surface.
    /// On any failure all resources created so far are released and no
    /// session is left active.
    pub async fn start(&mut self, kind: TransportKind, config: SessionConfig) -> Result<i64> {
        self.stop().await;

        tracing::info!(
            width = config.width,
            height = config.height,
            transport = ?kind,
            "starting session"
        );

        let surface = self.backend.create_surface(config.width, config.height)?;
        let texture_id = surface.texture_id;

        let decoder = match self.backend.create_decoder(&surface) {
            Ok(decoder) => decoder,
            Err(e) => {
                self.backend.release_surface(surface);
                return Err(e);
            }
        };

        let transport = match Transport::connect(&kind, self.link.as_ref(), &config).await {
            Ok(transport) => transport,
            Err(e) => {
                drop(decoder);
                self.backend.release_surface(surface);
                return Err(e);
            }
        };

        let stats = Arc::new(SessionStats::new());
        let sink = DecodeSink::new(
            decoder,
            config.input_buffer_timeout,
            config.max_decoder_errors,
            stats.clone(),
        );
        let session = Session::spawn(transport, sink, &config, stats.clone());

        self.active = Some(ActiveSession {
            session,
            surface: Some(surface),
            stats,
        });
        Ok(texture_id)
    }

    /// Stop the active session, if any. Idempotent.
    pub async fn stop(&mut self) {
        if let Some(mut active) = self.active.take() {
            tracing::debug!("stopping session");
            active.session.shutdown().await;
            if let Some(surface) = active.surface.take() {
                self.backend.release_surface(surface);
            }
        }
    }

    /// Whether a session is currently active (task may have finished
    /// on its own; its resources are still held until `stop()`)
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Counters for the active session
    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.active.as_ref().map(|a| a.stats.snapshot())
    }
}
