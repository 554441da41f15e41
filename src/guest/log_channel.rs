// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Guest log streaming.
//!
//! The guest never prints directly. It appends text with
//! `env.jsConsoleLogWrite(ptr, len)` and decides when a line is complete with
//! `env.jsConsoleLogFlush()`. Both callbacks run synchronously inside a
//! compile call, so the [`LogChannel`] lives in the store's host state and
//! needs no locking.

use crate::guest::error::GuestResult;
use crate::guest::marshal::decode_lossy;
use crate::guest::memory::{GuestPtr, MemoryView, MEMORY_EXPORT};
use crate::observability::messages::guest::{GuestLogFlushed, LossyGuestText};
use wasmtime::{Caller, Extern, Linker};

/// Import module the log callbacks are registered under.
pub const HOST_IMPORT_MODULE: &str = "env";
/// `(ptr: i32, len: i32) -> ()`
pub const LOG_WRITE_IMPORT: &str = "jsConsoleLogWrite";
/// `() -> ()`
pub const LOG_FLUSH_IMPORT: &str = "jsConsoleLogFlush";

/// A live output surface (terminal widget, tty) that guest log lines are
/// mirrored to when attached.
pub trait LogSurface: Send {
    fn write(&mut self, text: &str);
}

/// Renders one flush for a terminal: `\n` becomes `\r\n`, plus a final `\r\n`.
pub fn terminal_text(flushed: &str) -> String {
    let mut text = flushed.replace('\n', "\r\n");
    text.push_str("\r\n");
    text
}

/// Per-session log buffer fed by the guest callbacks.
#[derive(Default)]
pub struct LogChannel {
    buffer: String,
    surface: Option<Box<dyn LogSurface>>,
    transcript: Vec<String>,
}

impl LogChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(surface: Box<dyn LogSurface>) -> Self {
        Self {
            surface: Some(surface),
            ..Self::default()
        }
    }

    pub fn attach_surface(&mut self, surface: Box<dyn LogSurface>) {
        self.surface = Some(surface);
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn LogSurface>> {
        self.surface.take()
    }

    /// Appends guest text to the in-progress buffer.
    pub fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Text written since the last flush.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Delivers the buffer and resets it to empty.
    ///
    /// Always echoes to the operator console; writes to the surface only if
    /// one is attached. Flushing an empty buffer delivers an empty string.
    pub fn flush(&mut self) -> String {
        let flushed = std::mem::take(&mut self.buffer);

        tracing::info!(target: "guest", "{}", GuestLogFlushed { text: &flushed });

        if let Some(surface) = self.surface.as_mut() {
            surface.write(&terminal_text(&flushed));
        }

        self.transcript.push(flushed.clone());
        flushed
    }

    /// Every flush delivered so far, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn take_transcript(&mut self) -> Vec<String> {
        std::mem::take(&mut self.transcript)
    }

    /// True if the guest has said anything, flushed or not.
    pub fn has_diagnostics(&self) -> bool {
        !self.buffer.trim().is_empty() || self.transcript.iter().any(|t| !t.trim().is_empty())
    }
}

/// Registers the two log callbacks on `linker`.
///
/// `channel` projects the store's host state onto its [`LogChannel`].
pub fn add_to_linker<T: 'static>(
    linker: &mut Linker<T>,
    channel: fn(&mut T) -> &mut LogChannel,
) -> GuestResult<()> {
    linker.func_wrap(
        HOST_IMPORT_MODULE,
        LOG_WRITE_IMPORT,
        move |mut caller: Caller<'_, T>, ptr: i32, len: i32| -> wasmtime::Result<()> {
            let memory = caller
                .get_export(MEMORY_EXPORT)
                .and_then(Extern::into_memory)
                .ok_or_else(|| wasmtime::Error::msg("guest does not export 'memory'"))?;
            let view = MemoryView::new(memory);
            let ptr = GuestPtr::from_wasm(ptr);

            let (text, replaced) = decode_lossy(&view, &caller, ptr, len as u32)?;
            if replaced {
                tracing::warn!("{}", LossyGuestText { ptr, length: len as u32 });
            }

            channel(caller.data_mut()).append(&text);
            Ok(())
        },
    )?;

    linker.func_wrap(
        HOST_IMPORT_MODULE,
        LOG_FLUSH_IMPORT,
        move |mut caller: Caller<'_, T>| {
            channel(caller.data_mut()).flush();
        },
    )?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Surface that records everything written to it.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSurface(pub Arc<Mutex<Vec<String>>>);

    impl RecordingSurface {
        pub(crate) fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl LogSurface for RecordingSurface {
        fn write(&mut self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn test_append_flush_append() {
        let mut channel = LogChannel::new();
        channel.append("He");
        channel.append("llo");
        let delivered = channel.flush();
        channel.append("!");

        assert_eq!(delivered, "Hello");
        assert_eq!(channel.pending(), "!");
        assert_eq!(channel.transcript(), &["Hello".to_string()]);
    }

    #[test]
    fn test_flush_empty_is_not_an_error() {
        let mut channel = LogChannel::new();
        assert_eq!(channel.flush(), "");
        assert_eq!(channel.flush(), "");
        assert_eq!(channel.transcript().len(), 2);
        assert!(!channel.has_diagnostics());
    }

    #[test]
    fn test_surface_receives_normalized_lines() {
        let surface = RecordingSurface::default();
        let mut channel = LogChannel::with_surface(Box::new(surface.clone()));

        channel.append("line one\nline two");
        channel.flush();

        assert_eq!(surface.lines(), vec!["line one\r\nline two\r\n".to_string()]);
    }

    #[test]
    fn test_detached_surface_gets_nothing() {
        let surface = RecordingSurface::default();
        let mut channel = LogChannel::with_surface(Box::new(surface.clone()));
        assert!(channel.detach_surface().is_some());

        channel.append("quiet");
        assert_eq!(channel.flush(), "quiet");
        assert!(surface.lines().is_empty());
    }

    #[test]
    fn test_has_diagnostics_counts_pending_text() {
        let mut channel = LogChannel::new();
        channel.append("  \n");
        assert!(!channel.has_diagnostics());
        channel.append("warning: implicit declaration");
        assert!(channel.has_diagnostics());
    }

    #[test]
    fn test_terminal_text() {
        assert_eq!(terminal_text(""), "\r\n");
        assert_eq!(terminal_text("a\nb\n"), "a\r\nb\r\n\r\n");
    }
}
