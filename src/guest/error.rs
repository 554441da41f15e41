// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for guest module operations.
//!
//! Every variant is fatal for the current compile session. Nothing in this
//! crate retries; a failed session is restarted by re-issuing the whole
//! sequence (re-encode inputs, re-invoke compile).

use thiserror::Error;

/// Error message for Component Model binaries handed to the core-module host.
pub const GUEST_UNSUPPORTED_ENCODING: &str = "Unsupported guest binary: Component Model detected. \
The compiler guest must be a classic core WASM module exporting 'memory', 'allocUint8' and 'compile_program'.";

/// Error type for loading, linking and talking to the guest compiler.
#[derive(Error, Debug)]
pub enum GuestError {
    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// Binary is valid WASM but not a form this host can drive.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Guest imports a host function this host does not provide.
    #[error("Unsupported import '{module}::{name}'")]
    UnsupportedImport { module: String, name: String },

    /// A required export is absent.
    #[error("Guest module must export '{0}'")]
    MissingExport(String),

    /// An export exists with an unexpected type.
    #[error("Export '{name}' has unexpected signature: {detail}")]
    SignatureMismatch { name: String, detail: String },

    /// The guest allocator could not satisfy a request.
    #[error("Guest allocation of {requested} bytes failed via '{allocator}'")]
    AllocationFailed { allocator: &'static str, requested: u32 },

    /// Read or write past the current size of guest linear memory.
    #[error("Memory access out of bounds: offset={offset} length={length} memory_size={memory_size}")]
    OutOfBounds {
        offset: u64,
        length: u64,
        memory_size: u64,
    },

    /// Host tried to write more bytes than a region was allocated with.
    #[error("Write of {attempted} bytes exceeds region of {capacity} bytes at {ptr:#x}")]
    RegionOverflow {
        ptr: u32,
        capacity: u32,
        attempted: usize,
    },

    /// Host data does not fit the guest's 32-bit address space.
    #[error("Input too large for guest memory: {0} bytes")]
    InputTooLarge(usize),

    /// Bytes read back from the guest are not valid UTF-8.
    #[error("Text decode error: {0}")]
    TextDecode(#[from] std::str::Utf8Error),

    /// Wasmtime compilation, link or trap error (includes fuel exhaustion).
    #[error("WASM execution error: {0}")]
    Execution(#[from] wasmtime::Error),

    /// Engine construction failed.
    #[error("Engine creation error: {0}")]
    Engine(String),

    /// Input validation error (size limits, format).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Option list could not be serialized.
    #[error("Options serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    Parser(#[from] wasmparser::BinaryReaderError),

    /// File I/O error during module or image loading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for guest operations.
pub type GuestResult<T> = Result<T, GuestError>;
