// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{validate_artifact_name, OutputSink};
use crate::errors::SinkError;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the payload to `<directory>/<name>`, replacing any existing file.
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

impl OutputSink for FileSink {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn deliver(&mut self, name: &str, payload: &[u8]) -> Result<(), SinkError> {
        validate_artifact_name(name)?;
        fs::create_dir_all(&self.directory).map_err(|source| SinkError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.path_for(name);
        fs::write(&path, payload).map_err(|source| SinkError::Io { path, source })
    }
}
