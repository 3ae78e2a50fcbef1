//! Transport strategies
//!
//! A session reads video bytes from exactly one of two sources:
//!
//! - **Remote spawn**: run a server command on the device over the
//!   authenticated device link, wait for it to bind a rendezvous
//!   service, then open a second channel to that service for video.
//! - **Direct socket**: plain TCP connect to a host/port that already
//!   serves the byte stream.
//!
//! The choice is a closed set ([`TransportKind`]) decided at session
//! start; the session loop never branches on it again.

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::error::{Error, Result};
use crate::session::config::SessionConfig;

/// Boxed future returned by [`DeviceLink`] methods
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw byte source owned by a session
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Authenticated connection to the remote device
///
/// Supplied by the embedder; pairing, key material, and the underlying
/// protocol live entirely behind this trait. `service` uses the
/// device's addressing convention, e.g. `shell:<command>` to spawn a
/// process or `localabstract:<name>` for a local socket on the device.
pub trait DeviceLink: Send + Sync {
    /// Open a byte stream to `service`, or fail with a transport error
    fn open_stream<'a>(&'a self, service: &'a str) -> BoxFuture<'a, Result<ByteStream>>;
}

/// How a session reaches its video byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    /// Spawn a server process on the device, then connect to its
    /// rendezvous service over the device link
    RemoteSpawn {
        /// Command line executed on the device
        command: String,
    },
    /// Connect straight to a TCP endpoint already serving video
    DirectSocket {
        /// Remote host
        host: String,
        /// Remote port
        port: u16,
    },
}

/// A connected transport: the video byte source plus any side tasks
pub struct Transport {
    pub(crate) video: ByteStream,
    side_channel_drain: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("video", &"<byte stream>")
            .field("side_channel_drain", &self.side_channel_drain)
            .finish()
    }
}

impl Transport {
    /// Connect according to `kind`.
    ///
    /// Remote spawn performs the full settle/retry dance; direct socket
    /// is a single connect.
    pub async fn connect(
        kind: &TransportKind,
        link: &dyn DeviceLink,
        config: &SessionConfig,
    ) -> Result<Transport> {
        match kind {
            TransportKind::RemoteSpawn { command } => {
                Self::connect_remote_spawn(command, link, config).await
            }
            TransportKind::DirectSocket { host, port } => {
                tracing::debug!(host = %host, port = port, "connecting direct socket");
                let stream = TcpStream::connect((host.as_str(), *port)).await?;
                Ok(Transport {
                    video: Box::new(stream),
                    side_channel_drain: None,
                })
            }
        }
    }

    async fn connect_remote_spawn(
        command: &str,
        link: &dyn DeviceLink,
        config: &SessionConfig,
    ) -> Result<Transport> {
        tracing::debug!(command = %command, "spawning remote server");
        let shell = link.open_stream(&format!("shell:{}", command)).await?;

        // The server writes diagnostics to this channel. It must be
        // consumed for the server's whole lifetime or the remote process
        // blocks on a full output buffer.
        let drain = tokio::spawn(drain_side_channel(shell));

        sleep(config.settle_delay).await;

        let mut video = None;
        let mut attempts = 0;
        for attempt in 0..config.connect_attempts {
            attempts = attempt + 1;
            match link.open_stream(&config.rendezvous_service).await {
                Ok(stream) => {
                    tracing::info!(attempt = attempts, "connected to video channel");
                    video = Some(stream);
                    break;
                }
                Err(e) => {
                    if attempt % 5 == 0 {
                        tracing::debug!(
                            attempt = attempts,
                            max = config.connect_attempts,
                            error = %e,
                            "video channel not up yet"
                        );
                    }
                    sleep(config.connect_backoff).await;
                }
            }
        }

        match video {
            Some(video) => Ok(Transport {
                video,
                side_channel_drain: Some(drain),
            }),
            None => {
                drain.abort();
                Err(Error::ConnectFailed { attempts })
            }
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        // Closing the session closes the shell channel with it; the
        // drain task ends on that close, abort just hurries it along.
        if let Some(drain) = self.side_channel_drain.take() {
            drain.abort();
        }
    }
}

/// Consume the remote server's diagnostic output until the channel
/// closes. Output is only interesting in logs; errors here are the
/// channel going away and are swallowed.
async fn drain_side_channel(mut shell: ByteStream) {
    let mut buf = [0u8; 1024];
    loop {
        match shell.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = String::from_utf8_lossy(&buf[..n]);
                tracing::debug!(output = %text.trim_end(), "remote server");
            }
            Err(e) => {
                tracing::trace!(error = %e, "side channel closed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Link whose video service comes up only after a few attempts.
    struct SlowLink {
        video_ready_after: u32,
        video_attempts: AtomicU32,
    }

    impl DeviceLink for SlowLink {
        fn open_stream<'a>(&'a self, service: &'a str) -> BoxFuture<'a, Result<ByteStream>> {
            Box::pin(async move {
                if service.starts_with("shell:") {
                    let out: ByteStream = Box::new(Cursor::new(b"server up\n".to_vec()));
                    return Ok(out);
                }
                let n = self.video_attempts.fetch_add(1, Ordering::SeqCst);
                if n < self.video_ready_after {
                    Err(Error::Transport("socket not bound".into()))
                } else {
                    let video: ByteStream = Box::new(Cursor::new(vec![0, 0, 0, 1, 0x65]));
                    Ok(video)
                }
            })
        }
    }

    fn fast_config() -> SessionConfig {
        SessionConfig::default()
            .settle_delay(Duration::from_millis(1))
            .connect_retry(Duration::from_millis(1), 5)
    }

    #[tokio::test]
    async fn test_remote_spawn_retries_until_ready() {
        let link = SlowLink {
            video_ready_after: 3,
            video_attempts: AtomicU32::new(0),
        };
        let kind = TransportKind::RemoteSpawn {
            command: "mirror-server --bitrate 8M".into(),
        };

        let mut transport = Transport::connect(&kind, &link, &fast_config())
            .await
            .unwrap();
        assert_eq!(link.video_attempts.load(Ordering::SeqCst), 4);

        let mut data = Vec::new();
        transport.video.read_to_end(&mut data).await.unwrap();
        assert_eq!(data, vec![0, 0, 0, 1, 0x65]);
    }

    #[tokio::test]
    async fn test_remote_spawn_exhausts_retries() {
        let link = SlowLink {
            video_ready_after: 100,
            video_attempts: AtomicU32::new(0),
        };
        let kind = TransportKind::RemoteSpawn {
            command: "mirror-server".into(),
        };

        let err = Transport::connect(&kind, &link, &fast_config())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectFailed { attempts: 5 }));
    }

    #[tokio::test]
    async fn test_direct_socket_connect() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            tokio::io::AsyncWriteExt::write_all(&mut sock, &[0, 0, 0, 1, 0x41])
                .await
                .unwrap();
        });

        struct NoLink;
        impl DeviceLink for NoLink {
            fn open_stream<'a>(&'a self, _service: &'a str) -> BoxFuture<'a, Result<ByteStream>> {
                Box::pin(async { Err(Error::Transport("unused".into())) })
            }
        }

        let kind = TransportKind::DirectSocket {
            host: addr.ip().to_string(),
            port: addr.port(),
        };
        let mut transport = Transport::connect(&kind, &NoLink, &SessionConfig::default())
            .await
            .unwrap();

        let mut data = Vec::new();
        transport.video.read_to_end(&mut data).await.unwrap();
        assert_eq!(data, vec![0, 0, 0, 1, 0x41]);
    }
}
