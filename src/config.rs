// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the settings that drive a registry build. Settings come from three
//! layers: built-in defaults, an optional TOML configuration file, and
//! command-line flags, with later layers overriding earlier ones. This module
//! only handles the first two. Merging flags on top is left to the caller.
//!
//! # Configuration File Layout
//!
//! ```toml
//! modules_dir = "~/profiles/modules"
//! registry_dir = "$OUT_DIR/registry"
//! base_url = "https://registry.go-profile.dev"
//! on_duplicate = "error"
//! output = "staged"
//! ```
//!
//! Every key is optional. Directory paths undergo shell expansion.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Default directory to scan for module documents.
pub const DEFAULT_MODULES_DIR: &str = "./modules";

/// Default directory to write registry artifacts into.
pub const DEFAULT_REGISTRY_DIR: &str = "./registry";

/// Default base URL recorded in registry index.
pub const DEFAULT_BASE_URL: &str = "https://registry.go-profile.dev";

/// Registry build settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Directory to scan for module documents.
    pub modules_dir: PathBuf,

    /// Directory to write registry artifacts into.
    pub registry_dir: PathBuf,

    /// Base URL recorded verbatim in registry index.
    pub base_url: String,

    /// What to do when two module documents share a name.
    pub on_duplicate: DuplicatePolicy,

    /// How registry artifacts reach the registry directory.
    pub output: OutputMode,
}

impl BuilderConfig {
    /// Load configuration file from target path.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ReadFile`] if file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file is malformed.
    /// - Return [`ConfigError::ShellExpansion`] if a path cannot be expanded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_to_string(path.as_ref()).map_err(|err| ConfigError::ReadFile {
            source: err,
            path: path.as_ref().to_path_buf(),
        })?;

        content.parse()
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            modules_dir: DEFAULT_MODULES_DIR.into(),
            registry_dir: DEFAULT_REGISTRY_DIR.into(),
            base_url: DEFAULT_BASE_URL.into(),
            on_duplicate: DuplicatePolicy::default(),
            output: OutputMode::default(),
        }
    }
}

impl FromStr for BuilderConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: BuilderConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on directory fields.
        config.modules_dir = expand_path(&config.modules_dir)?;
        config.registry_dir = expand_path(&config.registry_dir)?;

        Ok(config)
    }
}

impl Display for BuilderConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    Ok(shellexpand::full(path.to_string_lossy().as_ref())
        .map_err(ConfigError::ShellExpansion)?
        .into_owned()
        .into())
}

/// Policy for module documents that resolve to the same module name.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Document visited last replaces earlier ones, with a warning.
    #[default]
    LastWins,

    /// Abort the build.
    Error,
}

/// Strategy for writing registry artifacts.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Build into a staging directory, then swap it into place once every
    /// stage has succeeded.
    #[default]
    Staged,

    /// Write into the registry directory as each stage completes.
    Direct,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file cannot be read.
    #[error("failed to read configuration file {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
