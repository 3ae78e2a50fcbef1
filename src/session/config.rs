//! Session configuration

use std::time::Duration;

use crate::decode::sink::{DEFAULT_INPUT_TIMEOUT, DEFAULT_MAX_DECODER_ERRORS};
use crate::media::framer::DEFAULT_SEEK_CEILING;

/// Configuration for one mirroring session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote device resolution: surface and decoder width
    pub width: u32,

    /// Remote device resolution: surface and decoder height
    pub height: u32,

    /// Transport read chunk size
    pub chunk_size: usize,

    /// Accumulated-byte cap while seeking the first start code
    pub seek_ceiling: usize,

    /// Delay after spawning the remote server before the first
    /// video-channel connect attempt
    pub settle_delay: Duration,

    /// Backoff between video-channel connect attempts
    pub connect_backoff: Duration,

    /// Maximum video-channel connect attempts
    pub connect_attempts: u32,

    /// Rendezvous service the remote server binds for video
    pub rendezvous_service: String,

    /// Wait for a decoder input buffer before dropping a unit
    pub input_buffer_timeout: Duration,

    /// Consecutive decoder errors before the session is failed
    pub max_decoder_errors: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            chunk_size: 64 * 1024,
            seek_ceiling: DEFAULT_SEEK_CEILING,
            settle_delay: Duration::from_secs(1),
            connect_backoff: Duration::from_millis(200),
            connect_attempts: 30,
            rendezvous_service: "localabstract:scrcpy".to_string(),
            input_buffer_timeout: DEFAULT_INPUT_TIMEOUT,
            max_decoder_errors: DEFAULT_MAX_DECODER_ERRORS,
        }
    }
}

impl SessionConfig {
    /// Create a config for the given remote resolution
    pub fn with_resolution(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the transport read chunk size
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the first-marker seek ceiling
    pub fn seek_ceiling(mut self, ceiling: usize) -> Self {
        self.seek_ceiling = ceiling;
        self
    }

    /// Set the remote-server settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the connect retry backoff and attempt cap
    pub fn connect_retry(mut self, backoff: Duration, attempts: u32) -> Self {
        self.connect_backoff = backoff;
        self.connect_attempts = attempts;
        self
    }

    /// Set the rendezvous service name
    pub fn rendezvous_service(mut self, service: impl Into<String>) -> Self {
        self.rendezvous_service = service.into();
        self
    }

    /// Set the decoder input buffer wait
    pub fn input_buffer_timeout(mut self, timeout: Duration) -> Self {
        self.input_buffer_timeout = timeout;
        self
    }

    /// Set the consecutive decoder error cap
    pub fn max_decoder_errors(mut self, cap: u32) -> Self {
        self.max_decoder_errors = cap;
        self
    }
}
