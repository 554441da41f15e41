// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Guest artifact loading and size validation
//!
//! This module reads the two session-level blobs from disk: the compiled
//! guest module and the packaged read-only filesystem image. It does not parse
//! either format; guest binary inspection is the responsibility of the
//! detector module.

use crate::guest::error::{GuestError, GuestResult};
use std::path::Path;
use std::sync::Arc;

/// Maximum allowed size for guest binaries and filesystem images (64 MB)
pub const MAX_ARTIFACT_SIZE: usize = 64 * 1024 * 1024;

/// Immutable packaged filesystem image, fetched once per session.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemImage {
    bytes: Arc<[u8]>,
}

impl FilesystemImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Label used in log lines for the compiled guest module.
pub const GUEST_MODULE: &str = "guest module";

/// Label used in log lines for the packaged filesystem image.
pub const FILESYSTEM_IMAGE: &str = "filesystem image";

/// Loads an artifact's bytes from a file and validates the size
///
/// # Arguments
/// * `kind` - What is being loaded, for log lines ([`GUEST_MODULE`] or [`FILESYSTEM_IMAGE`])
/// * `path` - Path to the file to load
///
/// # Returns
/// * `Ok(Vec<u8>)` - The file's bytes, unmodified
/// * `Err(GuestError)` - If the file cannot be read or its size exceeds the limit
pub fn load_artifact<P: AsRef<Path>>(kind: &'static str, path: P) -> GuestResult<Vec<u8>> {
    use crate::observability::messages::guest::{ArtifactLoadFailed, ArtifactLoaded};

    let path = path.as_ref();
    let path_str = path.display().to_string();
    let bytes = read_limited(path).map_err(|error| {
        tracing::error!(
            "{}",
            ArtifactLoadFailed {
                kind,
                path: &path_str,
                error: &error,
            }
        );
        error
    })?;

    tracing::info!(
        "{}",
        ArtifactLoaded {
            kind,
            path: &path_str,
            size_bytes: bytes.len(),
        }
    );

    Ok(bytes)
}

/// Rejects an in-memory artifact over [`MAX_ARTIFACT_SIZE`].
pub fn check_artifact_size(len: usize) -> GuestResult<()> {
    if len > MAX_ARTIFACT_SIZE {
        return Err(GuestError::Validation(format!(
            "Artifact too large: {} bytes (max: {} bytes)",
            len, MAX_ARTIFACT_SIZE
        )));
    }
    Ok(())
}

fn read_limited(path: &Path) -> GuestResult<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    check_artifact_size(bytes.len())?;
    Ok(bytes)
}
