//! Streaming output shared by the commands.

pub mod output;

pub use output::{RecordWriter, DEFAULT_OUTPUT_BUFFER, LOW_MEMORY_OUTPUT_BUFFER};
