// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use std::env;
use tcc_wasm_host::config::{load_and_validate_config, Config};
use tcc_wasm_host::guest::LogChannel;
use tcc_wasm_host::observability::messages::pipeline::UnflushedGuestText;
use tcc_wasm_host::options::OptionsList;
use tcc_wasm_host::output::{OutputSink, TerminalSurface};
use tcc_wasm_host::pipeline::{sinks_from_config, CompileRequest, Pipeline};
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise the config's level.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <config.yaml> <source.c> [option ...]", args[0]);
        eprintln!("Example: {} configs/tcc.yaml hello.c -c -r", args[0]);
        eprintln!("Options given on the command line replace compile.options from the config.");
        std::process::exit(2);
    }

    let config = load_and_validate_config(&args[1])?;
    init_tracing(&config);

    let source = tokio::fs::read_to_string(&args[2])
        .await
        .with_context(|| format!("reading source '{}'", args[2]))?;
    let options = if args.len() > 3 {
        OptionsList::from_entries(&args[3..])
    } else {
        config.compile.options.clone()
    };

    // Guest compilation and the compile itself are CPU-bound and synchronous.
    let report = tokio::task::spawn_blocking(move || -> Result<_> {
        let pipeline = Pipeline::from_config(&config)?;

        let log = if config.output.terminal {
            LogChannel::with_surface(Box::new(TerminalSurface::new()))
        } else {
            LogChannel::new()
        };

        let mut sinks = sinks_from_config(&config);
        let mut sink_refs: Vec<&mut dyn OutputSink> = sinks
            .iter_mut()
            .map(|sink| &mut **sink as &mut dyn OutputSink)
            .collect();

        let request = CompileRequest::new(options, source);
        Ok(pipeline.run(&request, log, &mut sink_refs)?)
    })
    .await
    .context("compile task panicked")??;

    if !report.unflushed.is_empty() {
        tracing::warn!(
            "{}",
            UnflushedGuestText {
                text: &report.unflushed
            }
        );
    }
    if !report.succeeded() {
        std::process::exit(1);
    }
    Ok(())
}
