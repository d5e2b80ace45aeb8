//! Pattern buffer with tail-search for prompt detection.
//!
//! Only the last N bytes of the accumulated output are searched for the
//! prompt, so a `show running-config` on a large box stays cheap.

use regex::bytes::Regex;

/// Buffer for accumulating device output and searching for prompts.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    ///
    /// # Arguments
    ///
    /// * `search_depth` - Number of bytes from the end to search for patterns.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Whether `pattern` matches within the last `search_depth` bytes.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.is_match(&self.buffer[start..])
    }

    /// Take the buffered bytes, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}

/// Return the last line of `data`, with surrounding whitespace trimmed.
///
/// After a prompt match this is the prompt itself.
pub fn last_line(data: &[u8]) -> String {
    let end = data
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    let trimmed = &data[..end];
    let start = memchr::memrchr(b'\n', trimmed).map_or(0, |pos| pos + 1);
    String::from_utf8_lossy(&trimmed[start..]).trim().to_string()
}
