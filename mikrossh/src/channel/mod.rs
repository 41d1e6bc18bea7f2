//! Channel layer for pattern matching and PTY operations.
//!
//! This module handles the read side of the interactive console,
//! including prompt detection and ANSI stripping.

mod buffer;
mod patterns;
mod pty;

pub use buffer::PatternBuffer;
pub use patterns::{PromptMatcher, PromptPattern};
pub use pty::PtyChannel;
