// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Compiler flag lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Program name shown in command-line previews.
pub const COMPILER_NAME: &str = "tcc";

/// Ordered compiler flags, sent to the guest as a JSON array string.
///
/// Entries are trimmed on the way in and empty or whitespace-only entries
/// are dropped. Order is preserved; the guest treats flags positionally.
///
/// # Example
/// ```
/// use tcc_wasm_host::options::OptionsList;
///
/// let options = OptionsList::from_entries(["-c", "  ", " hello.c "]);
/// assert_eq!(options.to_json().unwrap(), r#"["-c","hello.c"]"#);
/// assert_eq!(options.command_line(), "tcc -c hello.c");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct OptionsList {
    entries: Vec<String>,
}

impl OptionsList {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| entry.as_ref().trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON array form passed to `compile_program`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }

    /// `tcc` followed by each flag, space separated.
    pub fn command_line(&self) -> String {
        std::iter::once(COMPILER_NAME)
            .chain(self.entries.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Vec<String>> for OptionsList {
    fn from(entries: Vec<String>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<OptionsList> for Vec<String> {
    fn from(options: OptionsList) -> Self {
        options.entries
    }
}

impl fmt::Display for OptionsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}
