// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while handing a payload to an output sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact names are bare file names; separators and `..` are refused.
    #[error("Invalid artifact name: '{0}'")]
    InvalidName(String),

    /// Escaped mirror text that does not decode back to bytes.
    #[error("Malformed escape sequence at position {position}")]
    MalformedEscape { position: usize },
}
