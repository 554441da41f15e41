// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! String marshalling across the guest memory boundary.
//!
//! Host text goes in as a null-terminated UTF-8 byte sequence written into a
//! region obtained from a guest allocator export; guest text comes back out as
//! a `(ptr, len)` pair read through the [`MemoryView`].

use crate::guest::error::{GuestError, GuestResult};
use crate::guest::memory::{GuestPtr, GuestRegion, MemoryView};
use wasmtime::{AsContext, AsContextMut, Instance, TypedFunc};

/// General byte-buffer allocator export.
pub const ALLOC_EXPORT: &str = "allocUint8";
/// Allocator export dedicated to the filesystem image.
pub const ROMFS_ALLOC_EXPORT: &str = "get_romfs";

/// A size-parameterized guest allocator export, `(size: i32) -> ptr: i32`.
#[derive(Clone)]
pub struct GuestAllocator {
    name: &'static str,
    func: TypedFunc<i32, i32>,
}

impl GuestAllocator {
    pub fn from_instance(
        mut store: impl AsContextMut,
        instance: &Instance,
        name: &'static str,
    ) -> GuestResult<Self> {
        let func = instance
            .get_func(&mut store, name)
            .ok_or_else(|| GuestError::MissingExport(name.to_string()))?
            .typed::<i32, i32>(&store)
            .map_err(|_| GuestError::SignatureMismatch {
                name: name.to_string(),
                detail: "expected (i32) -> i32".to_string(),
            })?;
        Ok(Self { name, func })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Asks the guest for `size` bytes.
    ///
    /// A null pointer from the guest is its out-of-memory signal. There is no
    /// fallback allocation strategy.
    pub fn allocate(&self, mut store: impl AsContextMut, size: u32) -> GuestResult<GuestRegion> {
        let request = i32::try_from(size).map_err(|_| GuestError::InputTooLarge(size as usize))?;
        let ptr = GuestPtr::from_wasm(self.func.call(&mut store, request)?);
        if ptr.is_null() {
            return Err(GuestError::AllocationFailed {
                allocator: self.name,
                requested: size,
            });
        }
        Ok(GuestRegion::new(ptr, size))
    }
}

/// A null-terminated UTF-8 string living in guest memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedString {
    region: GuestRegion,
}

impl EncodedString {
    pub fn ptr(&self) -> GuestPtr {
        self.region.ptr()
    }

    /// Byte length of the text, excluding the terminator.
    pub fn text_len(&self) -> u32 {
        self.region.len() - 1
    }

    pub fn region(&self) -> GuestRegion {
        self.region
    }
}

/// Encodes and decodes strings against one guest instance.
#[derive(Clone)]
pub struct StringMarshaller {
    view: MemoryView,
    allocator: GuestAllocator,
}

impl StringMarshaller {
    pub fn new(view: MemoryView, allocator: GuestAllocator) -> Self {
        Self { view, allocator }
    }

    /// Writes `text` plus a trailing zero byte into a fresh guest allocation.
    pub fn encode(&self, mut store: impl AsContextMut, text: &str) -> GuestResult<EncodedString> {
        let bytes = text.as_bytes();
        let total = bytes
            .len()
            .checked_add(1)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(GuestError::InputTooLarge(bytes.len()))?;

        let region = self.allocator.allocate(&mut store, total)?;

        let mut terminated = Vec::with_capacity(total as usize);
        terminated.extend_from_slice(bytes);
        terminated.push(0);
        self.view.write_region(&mut store, region, &terminated)?;

        Ok(EncodedString { region })
    }

    /// Reads `length` bytes at `ptr` as strict UTF-8.
    pub fn decode(&self, store: impl AsContext, ptr: GuestPtr, length: u32) -> GuestResult<String> {
        decode(&self.view, store, ptr, length)
    }
}

/// Reads `length` bytes at `ptr` as strict UTF-8; invalid sequences are an error.
pub fn decode(view: &MemoryView, store: impl AsContext, ptr: GuestPtr, length: u32) -> GuestResult<String> {
    let bytes = view.bytes(store, ptr, length)?;
    Ok(std::str::from_utf8(&bytes)?.to_owned())
}

/// Reads `length` bytes at `ptr`, replacing invalid sequences with U+FFFD.
///
/// Returns the text and whether any replacement happened, so callers can
/// report the substitution instead of hiding it.
pub fn decode_lossy(
    view: &MemoryView,
    store: impl AsContext,
    ptr: GuestPtr,
    length: u32,
) -> GuestResult<(String, bool)> {
    let bytes = view.bytes(store, ptr, length)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok((text, false)),
        Err(e) => Ok((String::from_utf8_lossy(e.as_bytes()).into_owned(), true)),
    }
}
