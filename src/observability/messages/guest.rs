// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for events at the host/guest boundary.
//!
//! This module contains message types for logging events related to:
//! * Guest module and filesystem image loading
//! * Guest inspection and instantiation
//! * Input marshalling and the compile call
//! * The guest's own log stream

use crate::guest::memory::GuestPtr;
use crate::guest::session::EntryPointForm;
use std::fmt::{Display, Formatter};

/// Guest module or filesystem image read from disk.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tcc_wasm_host::observability::messages::guest::ArtifactLoaded;
///
/// let msg = ArtifactLoaded {
///     kind: "guest module",
///     path: "tcc-wasm.wasm",
///     size_bytes: 1_843_200,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ArtifactLoaded<'a> {
    pub kind: &'a str,
    pub path: &'a str,
    pub size_bytes: usize,
}

impl Display for ArtifactLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {}: {} ({} bytes)",
            self.kind, self.path, self.size_bytes
        )
    }
}

/// Reading a guest artifact failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use tcc_wasm_host::observability::messages::guest::ArtifactLoadFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
/// let msg = ArtifactLoadFailed {
///     kind: "filesystem image",
///     path: "romfs.bin",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ArtifactLoadFailed<'a> {
    pub kind: &'a str,
    pub path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ArtifactLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load {} '{}': {}",
            self.kind, self.path, self.error
        )
    }
}

/// Guest binary passed inspection.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct GuestInspected {
    pub imports: usize,
    pub exports: usize,
    /// Whether the guest imports the log flush callback.
    pub log_channel: bool,
}

impl Display for GuestInspected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest module accepted: {} imports, {} exports, log channel {}",
            self.imports,
            self.exports,
            if self.log_channel { "wired" } else { "unused" }
        )
    }
}

/// Fresh guest instance ready for a compile.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tcc_wasm_host::observability::messages::guest::SessionInstantiated;
///
/// let msg = SessionInstantiated {
///     memory_bytes: 16 * 65536,
///     fuel: 2_000_000_000,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SessionInstantiated {
    pub memory_bytes: u64,
    pub fuel: u64,
}

impl Display for SessionInstantiated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest instantiated: {} bytes of linear memory, fuel {}",
            self.memory_bytes, self.fuel
        )
    }
}

/// Filesystem image copied into the guest.
///
/// # Log Level
/// `info!` - Important operational event
pub struct FilesystemLoaded {
    pub ptr: GuestPtr,
    pub size_bytes: usize,
}

impl Display for FilesystemLoaded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Filesystem image loaded at {} ({} bytes)",
            self.ptr, self.size_bytes
        )
    }
}

/// Options and source written into guest memory.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use tcc_wasm_host::guest::GuestPtr;
/// use tcc_wasm_host::observability::messages::guest::InputsPrepared;
///
/// let msg = InputsPrepared {
///     options_ptr: GuestPtr::new(4096),
///     source_ptr: GuestPtr::new(4128),
///     source_len: 21,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Inputs prepared: options at 0x1000, source at 0x1020 (21 bytes)"
/// );
/// ```
pub struct InputsPrepared {
    pub options_ptr: GuestPtr,
    pub source_ptr: GuestPtr,
    pub source_len: u32,
}

impl Display for InputsPrepared {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Inputs prepared: options at {}, source at {} ({} bytes)",
            self.options_ptr, self.source_ptr, self.source_len
        )
    }
}

/// Entry point signature resolved.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct EntryPointResolved {
    pub form: EntryPointForm,
}

impl Display for EntryPointResolved {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Guest entry point is {}", self.form)
    }
}

/// Caller supplied inputs the guest's entry point cannot take.
///
/// # Log Level
/// `warn!` - Input was dropped
pub struct ArgumentsIgnored<'a> {
    pub form: EntryPointForm,
    pub ignored: &'a str,
}

impl Display for ArgumentsIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest entry point is {}; ignoring supplied {}",
            self.form, self.ignored
        )
    }
}

/// `compile_program` returned.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CompileReturned {
    pub ptr: GuestPtr,
    pub fuel_consumed: u64,
}

impl Display for CompileReturned {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest compile returned result at {} (fuel consumed: {})",
            self.ptr, self.fuel_consumed
        )
    }
}

/// One flushed block of guest log text.
///
/// Logged under the `guest` target so it reads as the guest's own console.
///
/// # Log Level
/// `info!` - Guest console output
pub struct GuestLogFlushed<'a> {
    pub text: &'a str,
}

impl Display for GuestLogFlushed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Guest log text contained invalid UTF-8 and was repaired.
///
/// # Log Level
/// `warn!` - Text was altered
pub struct LossyGuestText {
    pub ptr: GuestPtr,
    pub length: u32,
}

impl Display for LossyGuestText {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest log text at {} ({} bytes) is not valid UTF-8; invalid sequences replaced with U+FFFD",
            self.ptr, self.length
        )
    }
}
