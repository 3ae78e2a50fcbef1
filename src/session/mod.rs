//! Streaming session
//!
//! One session = one transport, one framer, one decode sink, one task.
//! The task pumps transport chunks through the framer and feeds the
//! resulting access units to the sink, in order, until end of stream,
//! a fatal error, or cancellation.

pub mod config;
pub mod controller;
pub mod transport;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use transport::{BoxFuture, ByteStream, DeviceLink, Transport, TransportKind};

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::decode::DecodeSink;
use crate::error::Result;
use crate::media::ByteStreamFramer;
use crate::stats::SessionStats;

/// Handle to a running session task
pub struct Session {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Session {
    /// Spawn the read/ingest/feed loop for a connected transport
    pub fn spawn(
        transport: Transport,
        sink: DecodeSink,
        config: &SessionConfig,
        stats: Arc<SessionStats>,
    ) -> Session {
        let (cancel, cancel_rx) = watch::channel(false);
        let framer = ByteStreamFramer::with_seek_ceiling(config.seek_ceiling);
        let chunk_size = config.chunk_size;

        let task = tokio::spawn(async move {
            match run(transport, framer, sink, cancel_rx, stats, chunk_size).await {
                Ok(()) => tracing::debug!("session ended"),
                Err(e) => tracing::error!(error = %e, "session failed"),
            }
        });

        Session { cancel, task }
    }

    /// Whether the session task has finished on its own
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the session and wait for its task to exit.
    ///
    /// Owned channels close when the task drops the transport, which
    /// unblocks any in-flight read.
    pub async fn shutdown(self) {
        let _ = self.cancel.send(true);
        let _ = self.task.await;
    }
}

async fn run(
    mut transport: Transport,
    mut framer: ByteStreamFramer,
    mut sink: DecodeSink,
    mut cancel: watch::Receiver<bool>,
    stats: Arc<SessionStats>,
    chunk_size: usize,
) -> Result<()> {
    let mut buf = vec![0u8; chunk_size];

    loop {
        if *cancel.borrow() {
            return Ok(());
        }

        let n = tokio::select! {
            _ = cancel.changed() => return Ok(()),
            read = transport.video.read(&mut buf) => read?,
        };

        if n == 0 {
            // Clean end of stream: the last unit has no closing marker,
            // flush it out before we go.
            if let Some(tail) = framer.flush() {
                sink.feed(&tail)?;
            }
            tracing::info!("end of stream");
            return Ok(());
        }

        stats.record_chunk(n);
        for unit in framer.ingest(&buf[..n]) {
            if *cancel.borrow() {
                return Ok(());
            }
            sink.feed(&unit)?;
        }
    }
}
