// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Decoding of the length-prefixed result region returned by `compile_program`.
//!
//! Layout at the returned pointer:
//!
//! ```text
//! [ L: u32 little-endian ][ L bytes of payload ]
//! ```
//!
//! `L` is read as signed. A zero or negative `L` means the guest produced no
//! output; the wire format does not say whether that was an empty compile or
//! a failed one, so the raw value is surfaced unchanged and the caller decides.

use crate::guest::error::{GuestError, GuestResult};
use crate::guest::memory::{GuestPtr, GuestRegion, MemoryView};
use wasmtime::AsContext;

/// Size of the length prefix.
pub const LENGTH_PREFIX_BYTES: u32 = 4;

/// Outcome of decoding a result region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultOutcome {
    /// `L > 0`: the payload bytes, copied out of guest memory.
    Payload(Vec<u8>),
    /// `L <= 0`: nothing to deliver. `declared_len` is the raw signed prefix.
    NoPayload { declared_len: i32 },
}

impl ResultOutcome {
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            ResultOutcome::Payload(bytes) => Some(bytes),
            ResultOutcome::NoPayload { .. } => None,
        }
    }

    pub fn into_payload(self) -> Option<Vec<u8>> {
        match self {
            ResultOutcome::Payload(bytes) => Some(bytes),
            ResultOutcome::NoPayload { .. } => None,
        }
    }
}

/// Reads the result region at `ptr`.
///
/// The four prefix bytes must be readable even when no payload follows.
/// A declared length that runs past the end of guest memory is a bounds
/// violation, never a truncated read.
pub fn decode_result(view: &MemoryView, store: impl AsContext, ptr: GuestPtr) -> GuestResult<ResultOutcome> {
    let declared_len = view.read_u32_le(&store, ptr)? as i32;
    if declared_len <= 0 {
        return Ok(ResultOutcome::NoPayload { declared_len });
    }

    let payload_ptr = ptr
        .checked_add(LENGTH_PREFIX_BYTES)
        .ok_or(GuestError::OutOfBounds {
            offset: ptr.offset() as u64 + LENGTH_PREFIX_BYTES as u64,
            length: declared_len as u64,
            memory_size: view.size(&store),
        })?;

    let region = GuestRegion::new(payload_ptr, declared_len as u32);
    Ok(ResultOutcome::Payload(view.read_region(&store, region)?))
}
