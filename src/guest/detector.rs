// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Guest binary inspection
//!
//! The guest binary is inspected with wasmparser before any compilation or
//! instantiation happens. Component Model binaries are rejected and imports
//! the host cannot satisfy are reported by name, so a bad guest fails with a
//! precise message instead of an opaque link error.

use crate::guest::error::{GuestError, GuestResult, GUEST_UNSUPPORTED_ENCODING};
use crate::guest::log_channel::{HOST_IMPORT_MODULE, LOG_FLUSH_IMPORT, LOG_WRITE_IMPORT};

use wasmparser::{Encoding, Parser, Payload};

/// What the host learned about a guest binary without instantiating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestManifest {
    /// `(module, name)` of every import, in declaration order.
    pub imports: Vec<(String, String)>,
    /// Names of every export, in declaration order.
    pub exports: Vec<String>,
}

impl GuestManifest {
    pub fn exports(&self, name: &str) -> bool {
        self.exports.iter().any(|e| e == name)
    }

    /// True if the guest streams diagnostics through the log callbacks.
    pub fn uses_log_channel(&self) -> bool {
        self.imports
            .iter()
            .any(|(module, name)| module == HOST_IMPORT_MODULE && name == LOG_FLUSH_IMPORT)
    }

    /// Fails with the first of `names` the guest does not export.
    pub fn require_exports(&self, names: &[&str]) -> GuestResult<()> {
        match names.iter().find(|name| !self.exports(name)) {
            Some(missing) => Err(GuestError::MissingExport(missing.to_string())),
            None => Ok(()),
        }
    }
}

/// Inspects a guest binary and returns its import/export manifest.
///
/// # Errors
/// Returns an error if:
/// - The input is empty, truncated, or otherwise not a valid WASM binary
/// - The binary is a Component Model component
/// - The binary imports anything other than the two log callbacks
pub fn inspect_guest(bytes: &[u8]) -> GuestResult<GuestManifest> {
    let parser = Parser::new(0);
    let mut encoding = None;
    let mut manifest = GuestManifest::default();

    for payload in parser.parse_all(bytes) {
        match payload? {
            Payload::Version { encoding: enc, .. } => {
                if enc == Encoding::Component {
                    return Err(GuestError::UnsupportedEncoding(
                        GUEST_UNSUPPORTED_ENCODING.to_string(),
                    ));
                }
                encoding = Some(enc);
            }
            Payload::ImportSection(reader) => {
                for import in reader {
                    let import = import?;
                    check_import(import.module, import.name)?;
                    manifest
                        .imports
                        .push((import.module.to_string(), import.name.to_string()));
                }
            }
            Payload::ExportSection(reader) => {
                for export in reader {
                    manifest.exports.push(export?.name.to_string());
                }
            }
            _ => {}
        }
    }

    if encoding.is_none() {
        return Err(GuestError::InvalidWasmBinary(
            "missing WASM header".to_string(),
        ));
    }

    Ok(manifest)
}

fn check_import(module: &str, name: &str) -> GuestResult<()> {
    let provided = module == HOST_IMPORT_MODULE && (name == LOG_WRITE_IMPORT || name == LOG_FLUSH_IMPORT);
    if !provided {
        return Err(GuestError::UnsupportedImport {
            module: module.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}
