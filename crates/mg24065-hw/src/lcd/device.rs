//! LCD upload over a transport.

use crate::bitmap::Bitmap;
use crate::transport::Transport;
use crate::Result;
use std::time::Duration;
use tracing::{debug, info};

use super::encoder::{Encoder, Session};
use super::protocol::Frame;

/// LCD controller reached through a transport.
pub struct LcdDevice<T> {
    transport: T,
    settle_delay: Duration,
}

impl<T: Transport> LcdDevice<T> {
    /// Wraps a transport, using its reset settle delay.
    pub fn new(transport: T) -> Self {
        let settle_delay = transport.settle_delay();
        Self {
            transport,
            settle_delay,
        }
    }

    /// Overrides the time waited after a reset frame.
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Returns the time waited after a reset frame.
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Sends one frame, blocking for the settle delay after a reset.
    pub fn send(&mut self, frame: &Frame) -> Result<()> {
        self.transport.write_frame(&frame.to_bytes())?;

        if frame.is_reset() {
            debug!("Waiting {:?} for reset to complete", self.settle_delay);
            std::thread::sleep(self.settle_delay);
        }
        Ok(())
    }

    /// Resets the controller.
    pub fn reset(&mut self) -> Result<()> {
        self.send(&Frame::reset())?;
        info!("Display reset");
        Ok(())
    }

    /// Sends frames in order, stopping at the first error.
    ///
    /// Returns the number of frames sent.
    pub fn upload<I>(&mut self, frames: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Frame>>,
    {
        let mut count = 0;
        let mut bytes = 0;
        for frame in frames {
            let frame = frame?;
            self.send(&frame)?;
            count += 1;
            bytes += frame.wire_len();
        }

        info!("Upload completed ({} frames, {} bytes)", count, bytes);
        Ok(count)
    }

    /// Encodes and uploads a bitmap.
    pub fn draw(&mut self, bitmap: &Bitmap, session: &Session) -> Result<usize> {
        let encoder = Encoder::new(bitmap, session)?;
        self.upload(encoder.frames())
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consumes the device, returning the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}
