//! Pattern buffer with tail-search.
//!
//! Only the last `search_depth` bytes are searched for the prompt, so long
//! outputs (`/system history print` on a busy router) stay cheap to scan.

use super::patterns::PromptMatcher;

/// Accumulates shell output and searches its tail for a prompt.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
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

    /// Search the tail of the buffer.
    ///
    /// Returns the end offset of the match in the full buffer.
    pub fn search_tail(&self, matcher: &dyn PromptMatcher) -> Option<usize> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        matcher
            .find_match(&self.buffer[start..])
            .map(|end| start + end)
    }

    /// Check if the tail contains a match.
    pub fn tail_contains(&self, matcher: &dyn PromptMatcher) -> bool {
        self.search_tail(matcher).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
