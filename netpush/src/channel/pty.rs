//! PTY channel for interactive device sessions.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::ChannelMsg;
use russh::client::Msg;

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Shell channel with pattern-based reads.
///
/// Wraps the russh channel opened by
/// [`SshTransport::open_channel`](crate::transport::SshTransport::open_channel).
pub struct PtyChannel {
    channel: russh::Channel<Msg>,

    /// Pattern buffer for accumulating output.
    buffer: PatternBuffer,
}

impl PtyChannel {
    pub(crate) fn new(channel: russh::Channel<Msg>, search_depth: usize) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::new(search_depth),
        }
    }

    /// Send one line of input, terminated with a newline.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        let line = format!("{input}\n");
        self.channel
            .data(line.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches the tail of the accumulated output.
    ///
    /// Returns everything read, prompt included, and empties the buffer.
    pub async fn read_until_pattern(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.buffer.tail_contains(pattern) {
                return Ok(self.buffer.take());
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => self.buffer.extend(&data),
                Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(other) => trace!("ignoring channel message: {:?}", other),
            }
        }
    }
}
