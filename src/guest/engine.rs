// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wasmtime engine configuration for the compiler guest.

use crate::guest::error::{GuestError, GuestResult};
use wasmtime::{Config, Engine};

/// Creates a Wasmtime engine configured for a classic core-module guest
///
/// **Enabled:**
/// - `consume_fuel(true)` - every store carries a fuel budget, so a runaway
///   compile traps instead of hanging the host
///
/// **Disabled:**
/// - Component Model, threads, multi-memory, memory64
/// - epoch interruption (fuel is the only interrupt source)
///
/// SIMD and bulk memory keep wasmtime's defaults; toolchains that target
/// `wasm32-freestanding` emit them.
pub fn create_engine() -> GuestResult<Engine> {
    let mut config = Config::new();

    config.wasm_component_model(false);
    config.wasm_threads(false); // Single-threaded guest, one compile at a time
    config.wasm_multi_memory(false); // Exactly one exported linear memory
    config.wasm_memory64(false); // GuestPtr is a 32-bit offset
    config.consume_fuel(true);
    config.epoch_interruption(false);

    tracing::debug!("Creating engine for classic WASM compiler guest");

    Engine::new(&config).map_err(|e| GuestError::Engine(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmtime::{Module, Store};

    #[test]
    fn test_create_engine() {
        let engine = create_engine();
        assert!(engine.is_ok(), "Should create classic module engine");
    }

    #[test]
    fn test_engine_meters_fuel() {
        let engine = create_engine().unwrap();
        let mut store = Store::new(&engine, ());
        store.set_fuel(1_000).unwrap();
        assert_eq!(store.get_fuel().unwrap(), 1_000);
    }

    #[test]
    fn test_engine_rejects_multi_memory() {
        let engine = create_engine().unwrap();
        let result = Module::new(&engine, "(module (memory 1) (memory 1))");
        assert!(result.is_err());
    }
}
