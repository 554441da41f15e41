// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod pipeline;
mod sink;

pub use config::ConfigError;
pub use pipeline::PipelineError;
pub use sink::SinkError;
