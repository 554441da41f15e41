// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // YAML config + fuel bounds
pub mod errors;     // config, sink and pipeline errors
pub mod guest;      // host/guest memory protocol
pub mod observability;
pub mod options;    // compiler flag lists
pub mod output;     // artifact sinks
pub mod pipeline;   // one compile, end to end
