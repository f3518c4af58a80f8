//! Structured message content.
//!
//! Assistant replies are plain text with optional fenced code blocks. The
//! parser splits them into [`ContentSegment`]s so that presentation layers
//! can render prose and code differently.

mod parser;

pub use parser::{ContentSegment, FENCE, parse};
