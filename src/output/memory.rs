// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::OutputSink;
use crate::errors::SinkError;

/// Keeps delivered artifacts in memory, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    artifacts: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery so far, oldest first.
    pub fn artifacts(&self) -> &[(String, Vec<u8>)] {
        &self.artifacts
    }

    pub fn last(&self) -> Option<&[u8]> {
        self.artifacts.last().map(|(_, bytes)| bytes.as_slice())
    }
}

impl OutputSink for MemorySink {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn deliver(&mut self, name: &str, payload: &[u8]) -> Result<(), SinkError> {
        self.artifacts.push((name.to_string(), payload.to_vec()));
        Ok(())
    }
}
