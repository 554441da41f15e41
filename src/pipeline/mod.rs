// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One compile, end to end.
//!
//! Each [`Pipeline::run`] gets a fresh guest instance, so nothing carries
//! over between compiles except the already-compiled module and the shared
//! filesystem image bytes:
//!
//! 1. instantiate the guest with the caller's [`LogChannel`]
//! 2. copy the filesystem image in, if there is one
//! 3. encode options and source, call `compile_program`
//! 4. decode the length-prefixed result
//! 5. hand a payload to every sink, once each
//!
//! Any error aborts the run. If the guest had already started, its pending
//! log text is flushed first and the transcript travels in
//! [`PipelineError::Compile`]. A "no payload" outcome is not an error; it
//! comes back in the [`CompileReport`] with whatever the guest logged.

#[cfg(test)]
mod integration_tests;

use crate::config::Config;
use crate::errors::PipelineError;
use crate::guest::loader::{load_artifact, FilesystemImage, FILESYSTEM_IMAGE};
use crate::guest::{
    CompileSession, GuestError, GuestModule, GuestResult, LogChannel, ResultOutcome,
};
use crate::observability::messages::pipeline::{
    CompileAborted, CompileStarted, DeliveryFailed, NoPayload, PayloadDecoded, PayloadDelivered,
    SilentFailure, UnrecognizedPayload,
};
use crate::options::OptionsList;
use crate::output::{BinaryKind, FileSink, MirrorSink, OutputSink, DEFAULT_ARTIFACT_NAME};

/// Inputs for a single compile.
#[derive(Debug, Clone, Default)]
pub struct CompileRequest {
    pub options: OptionsList,
    pub source: String,
}

impl CompileRequest {
    pub fn new(options: OptionsList, source: impl Into<String>) -> Self {
        Self {
            options,
            source: source.into(),
        }
    }
}

/// What a compile produced.
#[derive(Debug, Clone)]
pub struct CompileReport {
    pub outcome: ResultOutcome,
    /// `None` when there was no payload.
    pub binary_kind: Option<BinaryKind>,
    /// Every flush the guest made, in order.
    pub diagnostics: Vec<String>,
    /// Text the guest wrote but never flushed.
    pub unflushed: String,
    /// Kinds of the sinks that accepted the payload.
    pub delivered: Vec<&'static str>,
    pub fuel_consumed: u64,
}

impl CompileReport {
    pub fn payload(&self) -> Option<&[u8]> {
        self.outcome.payload()
    }

    pub fn succeeded(&self) -> bool {
        self.payload().is_some()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.unflushed.trim().is_empty() || self.diagnostics.iter().any(|d| !d.trim().is_empty())
    }
}

/// A loaded guest plus the per-compile settings that do not change between runs.
#[derive(Clone)]
pub struct Pipeline {
    module: GuestModule,
    filesystem: Option<FilesystemImage>,
    artifact_name: String,
}

impl Pipeline {
    pub fn new(module: GuestModule) -> Self {
        Self {
            module,
            filesystem: None,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
        }
    }

    pub fn with_filesystem(mut self, image: FilesystemImage) -> Self {
        self.filesystem = Some(image);
        self
    }

    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = name.into();
        self
    }

    /// Reads and compiles the guest and its filesystem image as configured.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let module = GuestModule::load(&config.guest.module, config.guest.fuel.effective())?;
        let mut pipeline = Self::new(module).with_artifact_name(config.output.filename.clone());
        if let Some(romfs) = &config.guest.romfs {
            let image = FilesystemImage::new(load_artifact(FILESYSTEM_IMAGE, romfs)?);
            pipeline = pipeline.with_filesystem(image);
        }
        Ok(pipeline)
    }

    pub fn module(&self) -> &GuestModule {
        &self.module
    }

    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    /// Runs one compile against a fresh guest instance.
    ///
    /// `log` receives the guest's log stream; attach a surface to it to see
    /// flushes live. Sinks are only called when there is a payload.
    pub fn run(
        &self,
        request: &CompileRequest,
        log: LogChannel,
        sinks: &mut [&mut dyn OutputSink],
    ) -> Result<CompileReport, PipelineError> {
        tracing::info!(
            "{}",
            CompileStarted {
                command_line: &request.options.command_line(),
                source_len: request.source.len(),
            }
        );

        let mut session = self.module.instantiate(log)?;
        let attempt = self.compile_in(&mut session, request);
        let fuel_consumed = session.fuel_consumed();

        let mut log = session.into_log();
        let outcome = match attempt {
            Ok(outcome) => outcome,
            Err(source) => return Err(Self::abort(log, source)),
        };

        let mut report = CompileReport {
            outcome,
            binary_kind: None,
            diagnostics: log.take_transcript(),
            unflushed: log.pending().to_string(),
            delivered: Vec::new(),
            fuel_consumed,
        };

        match &report.outcome {
            ResultOutcome::Payload(payload) => {
                let kind = BinaryKind::detect(payload);
                tracing::info!(
                    "{}",
                    PayloadDecoded {
                        size_bytes: payload.len(),
                        kind,
                    }
                );
                if !kind.is_elf() {
                    tracing::warn!(
                        "{}",
                        UnrecognizedPayload {
                            size_bytes: payload.len()
                        }
                    );
                }
                report.binary_kind = Some(kind);
                report.delivered = self.deliver(payload, sinks)?;
            }
            ResultOutcome::NoPayload { declared_len } => {
                tracing::info!(
                    "{}",
                    NoPayload {
                        declared_len: *declared_len,
                        flushes: report.diagnostics.len(),
                    }
                );
                if !report.has_diagnostics() {
                    tracing::warn!(
                        "{}",
                        SilentFailure {
                            declared_len: *declared_len
                        }
                    );
                }
            }
        }

        Ok(report)
    }

    fn compile_in(
        &self,
        session: &mut CompileSession,
        request: &CompileRequest,
    ) -> GuestResult<ResultOutcome> {
        if let Some(image) = &self.filesystem {
            session.load_filesystem(image)?;
        }
        let ptr = session.compile(&request.options, &request.source)?;
        session.decode_result(ptr)
    }

    /// Pushes out whatever the guest left in its buffer so the operator sees
    /// it, then wraps the failure together with the full transcript.
    fn abort(mut log: LogChannel, source: GuestError) -> PipelineError {
        if !log.pending().is_empty() {
            log.flush();
        }
        let diagnostics = log.take_transcript();
        tracing::error!(
            "{}",
            CompileAborted {
                error: &source,
                flushes: diagnostics.len(),
            }
        );
        PipelineError::Compile {
            source,
            diagnostics,
        }
    }

    fn deliver(
        &self,
        payload: &[u8],
        sinks: &mut [&mut dyn OutputSink],
    ) -> Result<Vec<&'static str>, PipelineError> {
        let mut delivered = Vec::with_capacity(sinks.len());
        for sink in sinks.iter_mut() {
            let kind = sink.kind();
            if let Err(error) = sink.deliver(&self.artifact_name, payload) {
                tracing::error!(
                    "{}",
                    DeliveryFailed {
                        sink: kind,
                        name: &self.artifact_name,
                        error: &error,
                    }
                );
                return Err(PipelineError::Delivery {
                    sink: kind,
                    source: error,
                });
            }
            tracing::info!(
                "{}",
                PayloadDelivered {
                    sink: kind,
                    name: &self.artifact_name,
                    size_bytes: payload.len(),
                }
            );
            delivered.push(kind);
        }
        Ok(delivered)
    }
}

/// The sinks named by the `output` section: always a file, plus the mirror if set.
pub fn sinks_from_config(config: &Config) -> Vec<Box<dyn OutputSink>> {
    let mut sinks: Vec<Box<dyn OutputSink>> =
        vec![Box::new(FileSink::new(config.output.directory.clone()))];
    if let Some(mirror) = &config.output.mirror {
        sinks.push(Box::new(MirrorSink::new(mirror.clone())));
    }
    sinks
}
