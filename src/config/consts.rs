// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default fuel per compile (2 billion instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 2_000_000_000;
/// Minimum allowed fuel level (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel level (20 billion instructions) - security limit
pub const MAX_FUEL_LEVEL: u64 = 20_000_000_000;
/// Log level used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";
