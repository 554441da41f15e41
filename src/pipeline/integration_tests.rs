// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::*;
use crate::config::load_and_validate_config;
use crate::errors::SinkError;
use crate::guest::log_channel::tests::RecordingSurface;
use crate::guest::test_guests::{assemble, FAKE_TCC_WAT, SILENT_WAT, TRAPPING_WAT, ZERO_ARG_WAT};
use crate::guest::GuestError;
use crate::output::{unescape_bytes, ElfClass, MemorySink};
use std::fs;
use tempfile::TempDir;

const FUEL: u64 = 50_000_000;

fn fake_tcc() -> Pipeline {
    Pipeline::new(GuestModule::from_bytes(&assemble(FAKE_TCC_WAT), FUEL).unwrap())
}

struct FailingSink;

impl OutputSink for FailingSink {
    fn kind(&self) -> &'static str {
        "failing"
    }

    fn deliver(&mut self, name: &str, _payload: &[u8]) -> Result<(), SinkError> {
        Err(SinkError::InvalidName(name.to_string()))
    }
}

#[test]
fn test_hello_world_yields_binary_or_diagnostics() {
    let pipeline = fake_tcc();
    let mut sink = MemorySink::new();
    let request = CompileRequest::new(OptionsList::default(), "int main(){return 0;}");

    let report = pipeline
        .run(&request, LogChannel::new(), &mut [&mut sink])
        .unwrap();

    match report.payload() {
        Some(payload) => assert!(payload.starts_with(b"\x7fELF")),
        None => assert!(report.has_diagnostics()),
    }
    assert!(report.succeeded());
    assert_eq!(report.binary_kind.map(|k| k.is_elf()), Some(true));
    assert_eq!(report.delivered, vec!["memory"]);
    assert_eq!(sink.artifacts().len(), 1);
    assert_eq!(sink.artifacts()[0].0, "a.out");
    assert!(report.fuel_consumed > 0);
}

#[test]
fn test_failed_compile_delivers_nothing_but_reports_diagnostics() {
    let pipeline = fake_tcc();
    let mut sink = MemorySink::new();

    let report = pipeline
        .run(&CompileRequest::default(), LogChannel::new(), &mut [&mut sink])
        .unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.outcome, ResultOutcome::NoPayload { declared_len: 0 });
    assert!(report.has_diagnostics());
    assert!(report.diagnostics.contains(&"error: no source".to_string()));
    assert!(report.binary_kind.is_none());
    assert!(report.delivered.is_empty());
    assert!(sink.artifacts().is_empty());
}

#[test]
fn test_negative_sentinel_keeps_options_echo() {
    let report = fake_tcc()
        .run(
            &CompileRequest::new(OptionsList::default(), "!"),
            LogChannel::new(),
            &mut [],
        )
        .unwrap();

    assert_eq!(report.outcome, ResultOutcome::NoPayload { declared_len: -1 });
    assert!(report.has_diagnostics());
    assert_eq!(report.diagnostics, vec!["tcc: options []".to_string()]);
}

#[test]
fn test_silent_failure_is_reported_not_raised() {
    let pipeline = Pipeline::new(GuestModule::from_bytes(&assemble(SILENT_WAT), FUEL).unwrap());
    let mut sink = MemorySink::new();

    let report = pipeline
        .run(
            &CompileRequest::new(OptionsList::default(), "int s;"),
            LogChannel::new(),
            &mut [&mut sink],
        )
        .unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.outcome, ResultOutcome::NoPayload { declared_len: -1 });
    assert!(!report.has_diagnostics());
    assert!(report.diagnostics.is_empty());
    assert!(report.unflushed.is_empty());
    assert!(report.delivered.is_empty());
    assert!(sink.artifacts().is_empty());
}

#[test]
fn test_trap_keeps_unflushed_diagnostics() {
    let pipeline = Pipeline::new(GuestModule::from_bytes(&assemble(TRAPPING_WAT), FUEL).unwrap());
    let surface = RecordingSurface::default();
    let mut sink = MemorySink::new();

    let result = pipeline.run(
        &CompileRequest::new(OptionsList::default(), "int t;"),
        LogChannel::with_surface(Box::new(surface.clone())),
        &mut [&mut sink],
    );

    assert_eq!(
        surface.lines(),
        vec![
            "tcc: options \r\n".to_string(),
            "error: internal compiler error\r\n".to_string()
        ]
    );
    match result {
        Err(error @ PipelineError::Compile { .. }) => {
            assert_eq!(
                error.diagnostics(),
                &["tcc: options ".to_string(), "error: internal compiler error".to_string()]
            );
            assert!(error.to_string().contains("error: internal compiler error"));
            assert!(matches!(
                error,
                PipelineError::Compile {
                    source: GuestError::Execution(_),
                    ..
                }
            ));
        }
        other => panic!("Expected Compile error, got {:?}", other.map(|r| r.outcome)),
    }
    assert!(sink.artifacts().is_empty());
}

#[test]
fn test_options_reach_guest_in_order() {
    let request = CompileRequest::new(
        OptionsList::from_entries(["-c", "", "-r", " hello.c "]),
        "int x;",
    );
    let report = fake_tcc().run(&request, LogChannel::new(), &mut []).unwrap();

    assert_eq!(
        report.diagnostics[0],
        r#"tcc: options ["-c","-r","hello.c"]"#
    );
}

#[test]
fn test_surface_sees_live_output() {
    let surface = RecordingSurface::default();
    let log = LogChannel::with_surface(Box::new(surface.clone()));

    fake_tcc()
        .run(&CompileRequest::default(), log, &mut [])
        .unwrap();

    assert_eq!(
        surface.lines(),
        vec![
            "tcc: options []\r\n".to_string(),
            "error: no source\r\n".to_string()
        ]
    );
}

#[test]
fn test_each_run_uses_fresh_instance() {
    let pipeline = fake_tcc();
    let request = CompileRequest::new(OptionsList::default(), "int a;");

    let first = pipeline.run(&request, LogChannel::new(), &mut []).unwrap();
    let second = pipeline.run(&request, LogChannel::new(), &mut []).unwrap();

    assert_eq!(first.payload(), second.payload());
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_filesystem_loaded_before_compile() {
    let pipeline = fake_tcc().with_filesystem(FilesystemImage::new(vec![7u8; 128 * 1024]));
    let report = pipeline
        .run(
            &CompileRequest::new(OptionsList::default(), "int b;"),
            LogChannel::new(),
            &mut [],
        )
        .unwrap();
    assert_eq!(&report.payload().unwrap()[4..], b"int b;");
}

#[test]
fn test_oversized_result_aborts_run() {
    let mut sink = MemorySink::new();
    let result = fake_tcc().run(
        &CompileRequest::new(OptionsList::default(), "?"),
        LogChannel::new(),
        &mut [&mut sink],
    );

    assert!(matches!(
        &result,
        Err(PipelineError::Compile {
            source: GuestError::OutOfBounds { .. },
            ..
        })
    ));
    let error = result.unwrap_err();
    assert_eq!(error.diagnostics(), &["tcc: options []".to_string()]);
    assert!(sink.artifacts().is_empty());
}

#[test]
fn test_delivery_failure_stops_at_failing_sink() {
    let mut before = MemorySink::new();
    let mut failing = FailingSink;
    let mut after = MemorySink::new();

    let result = fake_tcc().run(
        &CompileRequest::new(OptionsList::default(), "int c;"),
        LogChannel::new(),
        &mut [&mut before, &mut failing, &mut after],
    );

    assert!(matches!(
        result,
        Err(PipelineError::Delivery { sink: "failing", .. })
    ));
    assert_eq!(before.artifacts().len(), 1);
    assert!(after.artifacts().is_empty());
}

#[test]
fn test_zero_argument_guest_ignores_inputs() {
    let pipeline =
        Pipeline::new(GuestModule::from_bytes(&assemble(ZERO_ARG_WAT), FUEL).unwrap());
    let report = pipeline
        .run(
            &CompileRequest::new(OptionsList::from_entries(["-c"]), "int d;"),
            LogChannel::new(),
            &mut [],
        )
        .unwrap();

    assert_eq!(report.payload(), Some(&b"\x7fELF"[..]));
    assert_eq!(report.binary_kind, Some(BinaryKind::Elf(ElfClass::Unspecified)));
}

#[test]
fn test_from_config_end_to_end() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tcc.wasm"), assemble(FAKE_TCC_WAT)).unwrap();
    fs::write(dir.path().join("romfs.bin"), vec![1u8; 4096]).unwrap();
    fs::write(
        dir.path().join("tcc.yaml"),
        r#"
guest:
  module: tcc.wasm
  romfs: romfs.bin
  fuel:
    default: 50000000
output:
  directory: out
  filename: hello
  mirror: elf_data.txt
  terminal: false
"#,
    )
    .unwrap();

    let config = load_and_validate_config(dir.path().join("tcc.yaml")).unwrap();
    let pipeline = Pipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.artifact_name(), "hello");
    assert_eq!(pipeline.module().fuel(), 50_000_000);

    let mut sinks = sinks_from_config(&config);
    let mut sink_refs: Vec<&mut dyn OutputSink> = sinks
        .iter_mut()
        .map(|sink| &mut **sink as &mut dyn OutputSink)
        .collect();
    let report = pipeline
        .run(
            &CompileRequest::new(OptionsList::default(), "int e;"),
            LogChannel::new(),
            &mut sink_refs,
        )
        .unwrap();

    assert_eq!(report.delivered, vec!["file", "mirror"]);
    let written = fs::read(dir.path().join("out/hello")).unwrap();
    assert_eq!(written, report.payload().unwrap());
    let mirrored = fs::read_to_string(dir.path().join("elf_data.txt")).unwrap();
    assert_eq!(unescape_bytes(&mirrored).unwrap(), written);
}

#[test]
fn test_from_config_missing_module() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tcc.yaml"), "guest:\n  module: missing.wasm\n").unwrap();

    let config = load_and_validate_config(dir.path().join("tcc.yaml")).unwrap();
    assert!(matches!(
        Pipeline::from_config(&config),
        Err(PipelineError::Guest(GuestError::Io(_)))
    ));
}
