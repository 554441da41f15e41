// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounds-checked access to the guest's linear memory.
//!
//! Guest memory may grow during any call into the guest, which replaces the
//! backing buffer. [`MemoryView`] therefore holds only the store-relative
//! `wasmtime::Memory` handle and re-reads the live size and contents on every
//! access; no host slice into guest memory outlives a single call.
//!
//! [`GuestPtr`] is a bare offset that means nothing without the live memory
//! it indexes. [`GuestRegion`] pairs an offset with the length its producer
//! vouched for (an allocator request or a length prefix), and every access
//! through a region is checked against both that length and the current
//! memory size.

use crate::guest::error::{GuestError, GuestResult};
use std::fmt;
use wasmtime::{AsContext, AsContextMut, Instance, Memory};

/// Name of the guest's exported linear memory.
pub const MEMORY_EXPORT: &str = "memory";

/// An offset into the guest's linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GuestPtr(u32);

impl GuestPtr {
    pub const NULL: GuestPtr = GuestPtr(0);

    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Reinterprets an `i32` returned by a guest export as an unsigned offset.
    pub const fn from_wasm(raw: i32) -> Self {
        Self(raw as u32)
    }

    /// The value to hand back to the guest as an `i32` argument.
    pub const fn to_wasm(self) -> i32 {
        self.0 as i32
    }

    pub const fn offset(self) -> u32 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, delta: u32) -> Option<GuestPtr> {
        self.0.checked_add(delta).map(GuestPtr)
    }
}

impl fmt::Display for GuestPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A guest allocation: an offset plus the length it was granted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestRegion {
    ptr: GuestPtr,
    len: u32,
}

impl GuestRegion {
    pub const fn new(ptr: GuestPtr, len: u32) -> Self {
        Self { ptr, len }
    }

    pub const fn ptr(&self) -> GuestPtr {
        self.ptr
    }

    pub const fn len(&self) -> u32 {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Live window over the guest's linear memory.
#[derive(Debug, Clone, Copy)]
pub struct MemoryView {
    memory: Memory,
}

impl MemoryView {
    pub fn new(memory: Memory) -> Self {
        Self { memory }
    }

    /// Binds to the instance's exported `memory`.
    pub fn from_instance(store: impl AsContextMut, instance: &Instance) -> GuestResult<Self> {
        instance
            .get_memory(store, MEMORY_EXPORT)
            .map(Self::new)
            .ok_or_else(|| GuestError::MissingExport(MEMORY_EXPORT.to_string()))
    }

    /// Current size of guest memory in bytes.
    pub fn size(&self, store: impl AsContext) -> u64 {
        self.memory.data_size(store) as u64
    }

    /// Copies `length` bytes at `ptr` out of guest memory.
    pub fn bytes(&self, store: impl AsContext, ptr: GuestPtr, length: u32) -> GuestResult<Vec<u8>> {
        let start = self.checked_start(&store, ptr, length as u64)?;
        let mut buffer = vec![0u8; length as usize];
        self.memory
            .read(&store, start, &mut buffer)
            .map_err(|_| self.out_of_bounds(&store, ptr, length as u64))?;
        Ok(buffer)
    }

    /// Copies `data` into guest memory at `ptr`.
    pub fn write_bytes(&self, mut store: impl AsContextMut, ptr: GuestPtr, data: &[u8]) -> GuestResult<()> {
        let start = self.checked_start(&store, ptr, data.len() as u64)?;
        self.memory
            .write(&mut store, start, data)
            .map_err(|_| self.out_of_bounds(&store, ptr, data.len() as u64))
    }

    /// Reads a little-endian `u32` at `ptr`.
    pub fn read_u32_le(&self, store: impl AsContext, ptr: GuestPtr) -> GuestResult<u32> {
        let start = self.checked_start(&store, ptr, 4)?;
        let mut word = [0u8; 4];
        self.memory
            .read(&store, start, &mut word)
            .map_err(|_| self.out_of_bounds(&store, ptr, 4))?;
        Ok(u32::from_le_bytes(word))
    }

    /// Reads the whole of `region`.
    pub fn read_region(&self, store: impl AsContext, region: GuestRegion) -> GuestResult<Vec<u8>> {
        self.bytes(store, region.ptr(), region.len())
    }

    /// Writes `data` at the start of `region`; `data` must fit the region.
    pub fn write_region(
        &self,
        store: impl AsContextMut,
        region: GuestRegion,
        data: &[u8],
    ) -> GuestResult<()> {
        if data.len() > region.len() as usize {
            return Err(GuestError::RegionOverflow {
                ptr: region.ptr().offset(),
                capacity: region.len(),
                attempted: data.len(),
            });
        }
        self.write_bytes(store, region.ptr(), data)
    }

    fn checked_start(&self, store: impl AsContext, ptr: GuestPtr, length: u64) -> GuestResult<usize> {
        let memory_size = self.size(&store);
        let offset = ptr.offset() as u64;
        match offset.checked_add(length) {
            Some(end) if end <= memory_size => Ok(offset as usize),
            _ => Err(self.out_of_bounds(&store, ptr, length)),
        }
    }

    fn out_of_bounds(&self, store: impl AsContext, ptr: GuestPtr, length: u64) -> GuestError {
        GuestError::OutOfBounds {
            offset: ptr.offset() as u64,
            length,
            memory_size: self.size(store),
        }
    }
}
