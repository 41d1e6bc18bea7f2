//! PTY channel for the interactive RouterOS console.

use std::time::Duration;

use log::trace;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::buffer::PatternBuffer;
use super::patterns::PromptMatcher;
use crate::error::{ChannelError, Result};

/// Line terminator RouterOS expects from an interactive client.
const RETURN: &str = "\r\n";

/// An open shell channel with a pattern buffer on the read side.
pub struct PtyChannel {
    channel: Channel<Msg>,

    /// Pattern buffer for accumulating output.
    buffer: PatternBuffer,

    /// How long a single read may wait for the prompt.
    timeout: Duration,
}

impl PtyChannel {
    /// Wrap a channel on which a PTY and shell have already been requested.
    pub fn new(channel: Channel<Msg>, search_depth: usize, timeout: Duration) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::new(search_depth),
            timeout,
        }
    }

    /// Write one line, terminated with `\r\n`.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        let data = format!("{line}{RETURN}");
        self.channel
            .data(data.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `matcher` matches the buffer tail, then hand back
    /// everything read so far.
    pub async fn read_until_pattern(&mut self, matcher: &dyn PromptMatcher) -> Result<Vec<u8>> {
        let deadline = tokio::time::Instant::now() + self.timeout;

        loop {
            if let Some(end) = self.buffer.search_tail(matcher) {
                trace!("prompt matched at offset {}", end);
                return Ok(self.buffer.take());
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(self.timeout))?;

            match msg {
                Some(ChannelMsg::Data { ref data }) => {
                    trace!("read {} bytes", data.len());
                    self.buffer.extend(&data[..]);
                }
                Some(ChannelMsg::ExtendedData { ref data, .. }) => {
                    self.buffer.extend(&data[..]);
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }

    /// Drop anything still sitting in the buffer.
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Get the read timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Close the channel.
    pub async fn close(self) -> Result<()> {
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
