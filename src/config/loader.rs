// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_FUEL_LEVEL, DEFAULT_LOG_LEVEL, MAX_FUEL_LEVEL, MIN_FUEL_LEVEL};
use crate::errors::ConfigError;
use crate::options::OptionsList;
use crate::output::{validate_artifact_name, DEFAULT_ARTIFACT_NAME};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level host configuration.
///
/// Relative paths are resolved against the directory holding the config file
/// when it is loaded with [`load_config`].
///
/// # Example
/// ```yaml
/// guest:
///   module: tcc-wasm.wasm
///   romfs: romfs.bin
///   fuel:
///     default: 2000000000
/// compile:
///   options: ["-c", "-r", "hello.c"]
/// output:
///   directory: build
///   filename: a.out
///   mirror: elf_data.txt
///   terminal: true
/// log_level: info
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    pub guest: GuestConfig,
    #[serde(default)]
    pub compile: CompileConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the compiler guest and its filesystem image come from.
///
/// # Fields
/// * `module` - Path to the guest `.wasm` (required)
/// * `romfs` - Packaged filesystem image copied in before each compile (optional)
/// * `fuel` - Instruction budget per compile
#[derive(Debug, Deserialize)]
pub struct GuestConfig {
    pub module: PathBuf,
    #[serde(default)]
    pub romfs: Option<PathBuf>,
    #[serde(default)]
    pub fuel: FuelConfig,
}

/// Default compiler flags. Command-line flags replace these.
#[derive(Debug, Default, Deserialize)]
pub struct CompileConfig {
    #[serde(default)]
    pub options: OptionsList,
}

/// Where a decoded artifact goes.
///
/// # Fields
/// * `directory` - Directory the artifact is written to (defaults to `.`)
/// * `filename` - Artifact name (defaults to `a.out`)
/// * `mirror` - Optional file receiving the `%hh`-escaped payload
/// * `terminal` - Mirror guest log flushes to stdout (defaults to true)
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default)]
    pub mirror: Option<PathBuf>,
    #[serde(default = "default_terminal")]
    pub terminal: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            filename: default_filename(),
            mirror: None,
            terminal: default_terminal(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_filename() -> String {
    DEFAULT_ARTIFACT_NAME.to_string()
}

fn default_terminal() -> bool {
    true
}

/// Fuel budget for one compile.
///
/// Fuel bounds how many instructions the guest may execute before it traps,
/// so a runaway compile cannot hang the host.
///
/// # Fields
/// * `default` - Fuel given to each compile (defaults to 2B)
/// * `minimum` - Lower bound for any requested level (defaults to 1M)
/// * `maximum` - Upper bound for any requested level (defaults to 20B)
///
/// # Example
/// ```yaml
/// fuel:
///   default: 2000000000
///   minimum: 1000000
///   maximum: 20000000000
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FuelConfig {
    pub default: Option<u64>,
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
}

impl FuelConfig {
    /// Get the default fuel level, using built-in default if not configured.
    pub fn get_default(&self) -> u64 {
        self.default.unwrap_or(DEFAULT_FUEL_LEVEL)
    }

    /// Get the minimum fuel level, using built-in default if not configured.
    pub fn get_minimum(&self) -> u64 {
        self.minimum.unwrap_or(MIN_FUEL_LEVEL)
    }

    /// Get the maximum fuel level, using built-in default if not configured.
    pub fn get_maximum(&self) -> u64 {
        self.maximum.unwrap_or(MAX_FUEL_LEVEL)
    }

    /// Clamps a requested fuel level into `[minimum, maximum]`.
    ///
    /// # Example
    /// ```
    /// use tcc_wasm_host::config::FuelConfig;
    ///
    /// let config = FuelConfig::default();
    /// assert_eq!(config.validate_and_clamp(100), 1_000_000);
    /// assert_eq!(config.validate_and_clamp(u64::MAX), 20_000_000_000);
    /// ```
    pub fn validate_and_clamp(&self, requested: u64) -> u64 {
        requested.max(self.get_minimum()).min(self.get_maximum())
    }

    /// The default level after clamping.
    pub fn effective(&self) -> u64 {
        self.validate_and_clamp(self.get_default())
    }
}

impl Config {
    /// Rejects values that cannot work at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guest.module.as_os_str().is_empty() {
            return Err(ConfigError::invalid("guest.module", "must not be empty"));
        }
        if self.output.filename.trim().is_empty() {
            return Err(ConfigError::invalid("output.filename", "must not be empty"));
        }
        if validate_artifact_name(&self.output.filename).is_err() {
            return Err(ConfigError::invalid(
                "output.filename",
                format!("'{}' must be a bare file name", self.output.filename),
            ));
        }
        let fuel = &self.guest.fuel;
        if fuel.get_minimum() > fuel.get_maximum() {
            return Err(ConfigError::invalid(
                "guest.fuel",
                format!(
                    "minimum {} exceeds maximum {}",
                    fuel.get_minimum(),
                    fuel.get_maximum()
                ),
            ));
        }
        Ok(())
    }

    /// Makes every relative path relative to `base` instead of the working directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() && !path.as_os_str().is_empty() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.guest.module);
        if let Some(romfs) = self.guest.romfs.as_mut() {
            resolve(romfs);
        }
        resolve(&mut self.output.directory);
        if let Some(mirror) = self.output.mirror.as_mut() {
            resolve(mirror);
        }
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    if let Some(base) = path.parent() {
        cfg.resolve_paths(base);
    }
    Ok(cfg)
}

/// Load and validate a config from a YAML file
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
