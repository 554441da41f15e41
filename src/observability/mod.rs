// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Every lifecycle log line is produced by a message struct implementing
//! `Display`, so call sites never carry their own format strings.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::guest` - guest loading, instantiation, marshalling and log flushes
//! * `messages::pipeline` - compile runs, result decoding and delivery
//!
//! # Usage
//!
//! ```rust
//! use tcc_wasm_host::observability::messages::pipeline::CompileStarted;
//!
//! let msg = CompileStarted {
//!     command_line: "tcc -c hello.c",
//!     source_len: 21,
//! };
//!
//! tracing::info!("{}", msg);
//! ```
//!
//! Guest log flushes go out under the `guest` target, so they can be filtered
//! separately, e.g. `RUST_LOG=info,guest=off`.

pub mod messages;
