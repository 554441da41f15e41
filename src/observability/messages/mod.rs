// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `guest` - events at the host/guest boundary
//! * `pipeline` - compile invocation and output delivery events
//!
//! # Usage Pattern
//!
//! ```rust
//! use tcc_wasm_host::observability::messages::guest::SessionInstantiated;
//!
//! let msg = SessionInstantiated {
//!     memory_bytes: 65536,
//!     fuel: 2_000_000_000,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

pub mod guest;
pub mod pipeline;
