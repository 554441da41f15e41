// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Host side of the compiler guest boundary.
//!
//! The guest is a core WebAssembly module exposing one linear memory, two
//! allocator exports, and a `compile_program` entry point. It imports two log
//! callbacks from `env`. Everything here deals in raw `i32` offsets into that
//! memory; no higher-level interface types are involved.
//!
//! ## Modules
//!
//! - `loader`: reads guest and filesystem image bytes with a size limit
//! - `detector`: checks the binary's imports and exports before compiling it
//! - `engine`: wasmtime engine configuration
//! - `memory`: bounds-checked reads and writes over the exported memory
//! - `marshal`: null-terminated string encoding and `(ptr, len)` decoding
//! - `log_channel`: the buffered log callbacks
//! - `result`: the length-prefixed result region
//! - `session`: instantiation and the compile call sequence

pub mod detector;
pub mod engine;
pub mod error;
pub mod loader;
pub mod log_channel;
pub mod marshal;
pub mod memory;
pub mod result;
pub mod session;

#[cfg(test)]
pub(crate) mod test_guests;

pub use error::{GuestError, GuestResult};
pub use loader::FilesystemImage;
pub use log_channel::{LogChannel, LogSurface};
pub use memory::{GuestPtr, GuestRegion, MemoryView};
pub use result::ResultOutcome;
pub use session::{CompileSession, EntryPointForm, GuestModule};
