// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for compile invocations and output delivery.

use crate::output::BinaryKind;
use std::fmt::{Display, Formatter};

/// A compile invocation begins.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tcc_wasm_host::observability::messages::pipeline::CompileStarted;
///
/// let msg = CompileStarted {
///     command_line: "tcc -c -r hello.c",
///     source_len: 21,
/// };
///
/// assert_eq!(msg.to_string(), "Compiling: tcc -c -r hello.c (21 bytes of source)");
/// ```
pub struct CompileStarted<'a> {
    pub command_line: &'a str,
    pub source_len: usize,
}

impl Display for CompileStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiling: {} ({} bytes of source)",
            self.command_line, self.source_len
        )
    }
}

/// The result region held a payload.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PayloadDecoded {
    pub size_bytes: usize,
    pub kind: BinaryKind,
}

impl Display for PayloadDecoded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compile produced {} bytes ({})",
            self.size_bytes, self.kind
        )
    }
}

/// The payload header is not a recognised executable format.
///
/// # Log Level
/// `warn!` - Delivered anyway, but likely wrong
pub struct UnrecognizedPayload {
    pub size_bytes: usize,
}

impl Display for UnrecognizedPayload {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compile output ({} bytes) does not start with an ELF header",
            self.size_bytes
        )
    }
}

/// The result region declared a non-positive length.
///
/// # Log Level
/// `info!` - Compile ended without output; diagnostics explain why
pub struct NoPayload {
    pub declared_len: i32,
    pub flushes: usize,
}

impl Display for NoPayload {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compile produced no output (declared length {}, {} log flushes)",
            self.declared_len, self.flushes
        )
    }
}

/// No output and the guest said nothing about why.
///
/// # Log Level
/// `warn!` - Failure with no diagnostics
///
/// # Example
/// ```
/// use tcc_wasm_host::observability::messages::pipeline::SilentFailure;
///
/// tracing::warn!("{}", SilentFailure { declared_len: -1 });
/// ```
pub struct SilentFailure {
    pub declared_len: i32,
}

impl Display for SilentFailure {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compile produced no output and no diagnostics (declared length {})",
            self.declared_len
        )
    }
}

/// The guest failed partway through a compile.
///
/// # Log Level
/// `error!` - Failure requiring attention; the guest log precedes this line
pub struct CompileAborted<'a> {
    pub error: &'a dyn std::error::Error,
    pub flushes: usize,
}

impl Display for CompileAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compile aborted after {} log flushes: {}",
            self.flushes, self.error
        )
    }
}

/// The guest wrote log text but never flushed it.
///
/// # Log Level
/// `warn!` - Diagnostics that would otherwise be dropped
///
/// # Example
/// ```
/// use tcc_wasm_host::observability::messages::pipeline::UnflushedGuestText;
///
/// let msg = UnflushedGuestText { text: "hello.c:3: warning: " };
/// assert_eq!(msg.to_string(), "Guest left unflushed log text: hello.c:3: warning: ");
/// ```
pub struct UnflushedGuestText<'a> {
    pub text: &'a str,
}

impl Display for UnflushedGuestText<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Guest left unflushed log text: {}", self.text)
    }
}

/// Payload handed to a sink.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PayloadDelivered<'a> {
    pub sink: &'a str,
    pub name: &'a str,
    pub size_bytes: usize,
}

impl Display for PayloadDelivered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Delivered '{}' via {} sink ({} bytes)",
            self.name, self.sink, self.size_bytes
        )
    }
}

/// A sink refused the payload.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DeliveryFailed<'a> {
    pub sink: &'a str,
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to deliver '{}' via {} sink: {}",
            self.name, self.sink, self.error
        )
    }
}

/// Writing guest text to the terminal failed.
///
/// # Log Level
/// `debug!` - The flush is still in the transcript and the operator log
pub struct SurfaceWriteFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for SurfaceWriteFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Terminal surface write failed: {}", self.error)
    }
}
