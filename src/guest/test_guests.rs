// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stand-in compiler guests written in WebAssembly text.
//!
//! `FAKE_TCC_WAT` honours the full wire contract: `allocUint8`, `get_romfs`,
//! two-argument `compile_program`, and the two log callbacks. Its "compiler"
//! behaviour is keyed off the first byte of the source:
//!
//! * empty source: logs `error: no source`, returns a zero length prefix
//! * `!`: returns a `-1` length prefix after only the options echo
//! * `?`: returns a length prefix far past the end of memory
//! * anything else: returns `\x7fELF` followed by the source bytes
//!
//! Memory starts at one page and may grow to sixteen, so large allocations
//! exercise growth and oversized ones exercise allocator failure.

macro_rules! bump_allocator {
    () => {
        r#"
  (global $heap (mut i32) (i32.const 4096))
  (func $alloc (export "allocUint8") (param $size i32) (result i32)
    (local $ptr i32)
    (local $end i32)
    (local.set $ptr (global.get $heap))
    (local.set $end (i32.add (local.get $ptr) (local.get $size)))
    (if (i32.lt_u (local.get $end) (local.get $ptr))
      (then (return (i32.const 0))))
    (block $done
      (loop $grow
        (br_if $done (i32.le_u (local.get $end) (i32.mul (memory.size) (i32.const 65536))))
        (if (i32.eq (memory.grow (i32.const 1)) (i32.const -1))
          (then (return (i32.const 0))))
        (br $grow)))
    (global.set $heap (local.get $end))
    (local.get $ptr))
  (func $strlen (param $p i32) (result i32)
    (local $n i32)
    (block $done
      (loop $scan
        (br_if $done (i32.eqz (i32.load8_u (i32.add (local.get $p) (local.get $n)))))
        (local.set $n (i32.add (local.get $n) (i32.const 1)))
        (br $scan)))
    (local.get $n))
"#
    };
}

/// Only memory and `allocUint8`; no imports, no compile entry point.
pub const ALLOCATOR_ONLY_WAT: &str = concat!(
    r#"(module
  (memory (export "memory") 1 16)"#,
    bump_allocator!(),
    ")"
);

/// Full-contract stand-in for the compiler guest.
pub const FAKE_TCC_WAT: &str = concat!(
    r#"(module
  (import "env" "jsConsoleLogWrite" (func $log_write (param i32 i32)))
  (import "env" "jsConsoleLogFlush" (func $log_flush))
  (memory (export "memory") 1 16)
  (data (i32.const 16) "tcc: options ")
  (data (i32.const 48) "error: no source")
  (data (i32.const 80) "tcc: ok")"#,
    bump_allocator!(),
    r#"
  (func (export "get_romfs") (param $size i32) (result i32)
    (call $alloc (local.get $size)))
  (func (export "compile_program") (param $opts i32) (param $src i32) (result i32)
    (local $len i32)
    (local $out i32)
    (call $log_write (i32.const 16) (i32.const 13))
    (call $log_write (local.get $opts) (call $strlen (local.get $opts)))
    (call $log_flush)
    (local.set $len (call $strlen (local.get $src)))
    (if (i32.eqz (local.get $len))
      (then
        (call $log_write (i32.const 48) (i32.const 16))
        (call $log_flush)
        (local.set $out (call $alloc (i32.const 4)))
        (i32.store (local.get $out) (i32.const 0))
        (return (local.get $out))))
    (if (i32.eq (i32.load8_u (local.get $src)) (i32.const 33))
      (then
        (local.set $out (call $alloc (i32.const 4)))
        (i32.store (local.get $out) (i32.const -1))
        (return (local.get $out))))
    (if (i32.eq (i32.load8_u (local.get $src)) (i32.const 63))
      (then
        (local.set $out (call $alloc (i32.const 4)))
        (i32.store (local.get $out) (i32.const 0x7fffffff))
        (return (local.get $out))))
    (local.set $out (call $alloc (i32.add (local.get $len) (i32.const 8))))
    (i32.store (local.get $out) (i32.add (local.get $len) (i32.const 4)))
    (i32.store (i32.add (local.get $out) (i32.const 4)) (i32.const 0x464C457F))
    (memory.copy (i32.add (local.get $out) (i32.const 8)) (local.get $src) (local.get $len))
    (call $log_write (i32.const 80) (i32.const 7))
    (call $log_flush)
    (local.get $out))
)"#
);

/// Zero-argument entry point compiling a built-in program.
pub const ZERO_ARG_WAT: &str = concat!(
    r#"(module
  (import "env" "jsConsoleLogFlush" (func $log_flush))
  (memory (export "memory") 1 16)"#,
    bump_allocator!(),
    r#"
  (func (export "compile_program") (result i32)
    (local $out i32)
    (call $log_flush)
    (local.set $out (call $alloc (i32.const 8)))
    (i32.store (local.get $out) (i32.const 4))
    (i32.store (i32.add (local.get $out) (i32.const 4)) (i32.const 0x464C457F))
    (local.get $out))
)"#
);

/// One-argument entry point taking only the source; echoes it as the payload.
pub const ONE_ARG_WAT: &str = concat!(
    r#"(module
  (memory (export "memory") 1 16)"#,
    bump_allocator!(),
    r#"
  (func (export "compile_program") (param $src i32) (result i32)
    (local $len i32)
    (local $out i32)
    (local.set $len (call $strlen (local.get $src)))
    (local.set $out (call $alloc (i32.add (local.get $len) (i32.const 4))))
    (i32.store (local.get $out) (local.get $len))
    (memory.copy (i32.add (local.get $out) (i32.const 4)) (local.get $src) (local.get $len))
    (local.get $out))
)"#
);

/// Entry point with a signature outside the contract.
pub const BAD_SIGNATURE_WAT: &str = concat!(
    r#"(module
  (memory (export "memory") 1 16)"#,
    bump_allocator!(),
    r#"
  (func (export "compile_program") (param i32 i32 i32) (result i32) i32.const 0)
)"#
);

/// Writes one diagnostic without flushing it, then traps.
pub const TRAPPING_WAT: &str = concat!(
    r#"(module
  (import "env" "jsConsoleLogWrite" (func $log_write (param i32 i32)))
  (import "env" "jsConsoleLogFlush" (func $log_flush))
  (memory (export "memory") 1 16)
  (data (i32.const 16) "tcc: options ")
  (data (i32.const 48) "error: internal compiler error")"#,
    bump_allocator!(),
    r#"
  (func (export "compile_program") (param $opts i32) (param $src i32) (result i32)
    (call $log_write (i32.const 16) (i32.const 13))
    (call $log_flush)
    (call $log_write (i32.const 48) (i32.const 30))
    unreachable)
)"#
);

/// Returns a `-1` length prefix without ever touching the log callbacks.
pub const SILENT_WAT: &str = concat!(
    r#"(module
  (memory (export "memory") 1 16)"#,
    bump_allocator!(),
    r#"
  (func (export "compile_program") (param $opts i32) (param $src i32) (result i32)
    (local $out i32)
    (local.set $out (call $alloc (i32.const 4)))
    (i32.store (local.get $out) (i32.const -1))
    (local.get $out))
)"#
);

/// Assembles one of the guests above.
pub fn assemble(wat: &str) -> Vec<u8> {
    wat::parse_str(wat).expect("test guest must assemble")
}
