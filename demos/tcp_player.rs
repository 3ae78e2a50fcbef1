//! Connects to a TCP endpoint serving a raw Annex-B stream and runs a
//! session against a logging decoder backend (no real codec).
//!
//! Usage: `cargo run --example tcp_player -- <host> <port>`

use std::sync::Arc;
use std::time::Duration;

use mirror_rs::{
    BufferIndex, Decoder, DecoderBackend, DeviceLink, Error, Result, SessionConfig,
    SessionController, Surface, TransportKind,
};

/// Decoder that just logs what it is fed.
struct LoggingDecoder {
    pending_outputs: u32,
}

impl Decoder for LoggingDecoder {
    fn dequeue_input(&mut self, _timeout: Duration) -> Result<Option<BufferIndex>> {
        Ok(Some(0))
    }

    fn queue_input(&mut self, _index: BufferIndex, data: &[u8], _pts_us: u64) -> Result<()> {
        tracing::info!(len = data.len(), "access unit");
        self.pending_outputs += 1;
        Ok(())
    }

    fn dequeue_output(&mut self) -> Result<Option<BufferIndex>> {
        if self.pending_outputs > 0 {
            self.pending_outputs -= 1;
            Ok(Some(0))
        } else {
            Ok(None)
        }
    }

    fn release_output(&mut self, _index: BufferIndex, _render: bool) -> Result<()> {
        Ok(())
    }
}

struct LoggingBackend;

impl DecoderBackend for LoggingBackend {
    fn create_surface(&self, width: u32, height: u32) -> Result<Surface> {
        tracing::info!(width, height, "surface created");
        Ok(Surface {
            texture_id: 1,
            width,
            height,
        })
    }

    fn create_decoder(&self, _surface: &Surface) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(LoggingDecoder { pending_outputs: 0 }))
    }

    fn release_surface(&self, surface: Surface) {
        tracing::info!(texture_id = surface.texture_id, "surface released");
    }
}

/// Direct-socket sessions never touch the device link.
struct NoLink;

impl DeviceLink for NoLink {
    fn open_stream<'a>(
        &'a self,
        _service: &'a str,
    ) -> mirror_rs::BoxFuture<'a, Result<mirror_rs::ByteStream>> {
        Box::pin(async { Err(Error::Transport("no device link configured".into())) })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".into());
    let port: u16 = args
        .next()
        .and_then(|p| p.parse().ok())
        .unwrap_or(27183);

    let mut controller = SessionController::new(Arc::new(LoggingBackend), Arc::new(NoLink));
    let texture_id = controller
        .start(
            TransportKind::DirectSocket { host, port },
            SessionConfig::with_resolution(1920, 1080),
        )
        .await?;
    tracing::info!(texture_id, "session started, ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    if let Some(stats) = controller.stats() {
        tracing::info!(?stats, "final counters");
    }
    controller.stop().await;
    Ok(())
}
