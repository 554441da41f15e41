// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::guest::LogSurface;
use crate::observability::messages::pipeline::SurfaceWriteFailed;
use std::io::Write;

/// Mirrors guest log flushes to the process's stdout.
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl LogSurface for TerminalSurface {
    fn write(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(error) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
            tracing::debug!("{}", SurfaceWriteFailed { error: &error });
        }
    }
}
