// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Destinations for decoded compile output.
//!
//! An [`OutputSink`] receives the payload under its artifact name, at most
//! once per compile. Sinks never see a "no payload" outcome.

mod binary;
mod file;
mod memory;
mod mirror;
mod terminal;

use crate::errors::SinkError;

pub use binary::{BinaryKind, ElfClass};
pub use file::FileSink;
pub use memory::MemorySink;
pub use mirror::{escape_bytes, unescape_bytes, MirrorSink};
pub use terminal::TerminalSurface;

/// Fixed name of the compiled artifact.
pub const DEFAULT_ARTIFACT_NAME: &str = "a.out";

/// Persists a decoded payload.
pub trait OutputSink: Send {
    /// Short identifier used in log lines.
    fn kind(&self) -> &'static str;

    fn deliver(&mut self, name: &str, payload: &[u8]) -> Result<(), SinkError>;
}

/// Rejects names that would escape the sink's directory.
pub(crate) fn validate_artifact_name(name: &str) -> Result<(), SinkError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(SinkError::InvalidName(name.to_string()));
    }
    Ok(())
}
