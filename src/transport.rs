//! The bulk transport consumed by the driver.
//!
//! The library never talks to USB directly; everything it sends goes through
//! this trait. Enumeration hands each [`Device`](crate::Device) a boxed
//! transport, and the framing layer calls it at exactly three seams: flushing
//! the staged command buffer, selecting a command channel, and streaming a
//! mode-program blob. Every call honours the device's configured timeout.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport timed out after {timeout_ms} ms")]
    TimedOut { timeout_ms: u32 },

    #[error("transport I/O failed: {0}")]
    Io(String),
}

pub trait Transport {
    /// Deliver staged command bytes to the adapter's bulk endpoint.
    fn write(&mut self, bytes: &[u8], timeout_ms: u32) -> Result<(), TransportError>;

    /// Issue a channel-select control request carrying `bytes` verbatim.
    fn control_channel(&mut self, bytes: &[u8], timeout_ms: u32) -> Result<(), TransportError>;

    /// Stream a large pre-framed block (mode-program blobs) to the bulk
    /// endpoint, bypassing the command buffer.
    fn bulk_write(&mut self, bytes: &[u8], timeout_ms: u32) -> Result<(), TransportError>;
}
