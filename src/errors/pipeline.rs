// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::SinkError;
use crate::guest::GuestError;
use thiserror::Error;

/// Any failure that aborts a compile invocation.
///
/// There is no retry; the caller sees the first error and the session is
/// discarded.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Loading or instantiating the guest failed before it could log anything.
    #[error(transparent)]
    Guest(#[from] GuestError),

    /// The guest failed mid-compile. `diagnostics` holds everything it
    /// logged up to that point, with any unflushed text flushed last.
    #[error("Compile aborted: {source}{}", guest_log_suffix(.diagnostics))]
    Compile {
        #[source]
        source: GuestError,
        diagnostics: Vec<String>,
    },

    #[error("Output delivery via '{sink}' failed: {source}")]
    Delivery {
        sink: &'static str,
        #[source]
        source: SinkError,
    },
}

impl PipelineError {
    /// What the guest logged before the failure; empty unless the compile itself failed.
    pub fn diagnostics(&self) -> &[String] {
        match self {
            PipelineError::Compile { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

fn guest_log_suffix(diagnostics: &[String]) -> String {
    let lines: Vec<&str> = diagnostics
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        String::new()
    } else {
        format!(" (guest log: {})", lines.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_error_is_transparent() {
        let error: PipelineError = GuestError::MissingExport("compile_program".to_string()).into();
        assert_eq!(
            error.to_string(),
            GuestError::MissingExport("compile_program".to_string()).to_string()
        );
        assert!(error.diagnostics().is_empty());
    }

    #[test]
    fn test_compile_error_quotes_guest_log() {
        let error = PipelineError::Compile {
            source: GuestError::Validation("trap".to_string()),
            diagnostics: vec![
                "tcc: options []".to_string(),
                "  ".to_string(),
                "error: internal compiler error\n".to_string(),
            ],
        };
        let message = error.to_string();
        assert!(message.starts_with("Compile aborted: "));
        assert!(message.ends_with("(guest log: tcc: options []; error: internal compiler error)"));
        assert_eq!(error.diagnostics().len(), 3);
    }

    #[test]
    fn test_compile_error_without_guest_log() {
        let error = PipelineError::Compile {
            source: GuestError::Validation("trap".to_string()),
            diagnostics: Vec::new(),
        };
        assert!(!error.to_string().contains("guest log"));
    }

    #[test]
    fn test_delivery_names_the_sink() {
        let error = PipelineError::Delivery {
            sink: "file",
            source: SinkError::InvalidName("../a.out".to_string()),
        };
        assert!(error.to_string().starts_with("Output delivery via 'file' failed"));
    }
}
