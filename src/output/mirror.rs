// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Byte-escaped copy of the last payload.
//!
//! Every byte is written as `%hh` with two lowercase hex digits, so the
//! mirror is plain ASCII and can be stored wherever only text is allowed.

use super::{validate_artifact_name, OutputSink};
use crate::errors::SinkError;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub fn escape_bytes(payload: &[u8]) -> String {
    let mut escaped = String::with_capacity(payload.len() * 3);
    for byte in payload {
        // Writing to a String cannot fail.
        let _ = write!(escaped, "%{:02x}", byte);
    }
    escaped
}

/// Reverses [`escape_bytes`]. Accepts either hex case.
pub fn unescape_bytes(escaped: &str) -> Result<Vec<u8>, SinkError> {
    let raw = escaped.as_bytes();
    if raw.len() % 3 != 0 {
        return Err(SinkError::MalformedEscape {
            position: raw.len() - raw.len() % 3,
        });
    }

    raw.chunks(3)
        .enumerate()
        .map(|(index, chunk)| {
            let position = index * 3;
            match chunk {
                [b'%', hi, lo] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    Ok((hex_value(*hi) << 4) | hex_value(*lo))
                }
                _ => Err(SinkError::MalformedEscape { position }),
            }
        })
        .collect()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Overwrites a single text file with the escaped form of each payload.
///
/// Only the most recent payload is kept; the artifact name is checked but
/// does not affect the destination.
#[derive(Debug, Clone)]
pub struct MirrorSink {
    path: PathBuf,
}

impl MirrorSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the mirror back into bytes.
    pub fn restore(&self) -> Result<Vec<u8>, SinkError> {
        let text = fs::read_to_string(&self.path).map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })?;
        unescape_bytes(text.trim_end())
    }
}

impl OutputSink for MirrorSink {
    fn kind(&self) -> &'static str {
        "mirror"
    }

    fn deliver(&mut self, name: &str, payload: &[u8]) -> Result<(), SinkError> {
        validate_artifact_name(name)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, escape_bytes(payload)).map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
