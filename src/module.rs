// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Module document layout.
//!
//! A __module__ is a single JSON document describing one unit of shell
//! configuration: environment variables, aliases, functions, path entries,
//! managed files, and executable checks. Module authors write these by hand,
//! and the registry builder only ever reads them.
//!
//! # General Layout
//!
//! Every module carries identifying metadata (name, version, description,
//! category), a compatibility declaration (platforms and shells), an optional
//! dependency declaration, and the configuration payload itself. Fields at
//! every level fall back to empty values when missing or `null`, so an alias
//! without a command is still a valid alias. Values of the wrong type are
//! rejected.

use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeSet, str::FromStr};

/// Shell profile module.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Module {
    /// Unique name of module in registry.
    ///
    /// May be empty in the document itself, in which case the scanner derives
    /// it from the filename.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Semantic version string.
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,

    /// Brief description of what the module configures.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,

    /// Category key that module is aggregated under.
    pub category: Option<String>,

    pub author: Option<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub repository: Option<Repository>,

    /// Platforms that module supports, e.g., "linux" or "darwin".
    #[serde(deserialize_with = "null_as_default")]
    pub platforms: Vec<String>,

    /// Shells that module supports, e.g., "bash" or "zsh".
    #[serde(deserialize_with = "null_as_default")]
    pub shells: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Dependencies>,

    #[serde(deserialize_with = "null_as_default")]
    pub environment: Vec<Environment>,
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: Vec<Alias>,
    #[serde(deserialize_with = "null_as_default")]
    pub functions: Vec<Function>,
    #[serde(deserialize_with = "null_as_default")]
    pub path: Vec<PathEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub files: Vec<File>,
    #[serde(deserialize_with = "null_as_default")]
    pub checks: Vec<Check>,
}

impl Module {
    /// Category of module if one was declared.
    ///
    /// An empty category string counts as no category at all.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|category| !category.is_empty())
    }

    /// Author of module if one was declared.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref().filter(|author| !author.is_empty())
    }

    /// License of module if one was declared.
    pub fn license(&self) -> Option<&str> {
        self.license.as_deref().filter(|license| !license.is_empty())
    }

    /// Derive discovery tags for module.
    ///
    /// Tags are gathered from the category, the module name, each supported
    /// platform and shell, and each required command of the dependency
    /// declaration. Duplicates collapse, case is preserved, and the result
    /// is always sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = BTreeSet::new();

        if let Some(category) = self.category() {
            tags.insert(category);
        }

        if !self.name.is_empty() {
            tags.insert(self.name.as_str());
        }

        tags.extend(self.platforms.iter().map(String::as_str));
        tags.extend(self.shells.iter().map(String::as_str));

        if let Some(dependencies) = &self.dependencies {
            tags.extend(dependencies.commands.iter().map(String::as_str));
        }

        tags.into_iter()
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl FromStr for Module {
    type Err = ModuleError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(data).map_err(ModuleError::Deserialize)
    }
}

/// Source repository of module.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Repository {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// Dependency declaration of module.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Dependencies {
    /// Other modules that must be installed alongside.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub modules: Vec<String>,

    /// External commands that must be available.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub commands: Vec<String>,

    /// External commands that are used when available.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub optional: Vec<String>,
}

/// Environment variable declaration.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Environment {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(deserialize_with = "null_as_default")]
    pub export: bool,
    pub description: Option<String>,
}

/// Shell alias declaration.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Alias {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub command: String,
    pub description: Option<String>,
}

/// Shell function declaration.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Function {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub commands: Vec<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub parameters: Vec<String>,
}

/// Entry to add to `PATH`.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub directory: String,

    /// Prepend instead of append.
    #[serde(deserialize_with = "null_as_default")]
    pub prepend: bool,
}

/// File managed by module.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct File {
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    pub content: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub source: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub execute: bool,
    pub mode: Option<String>,
    pub description: Option<String>,
}

/// Executable check run before module is applied.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Check {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    pub description: Option<String>,
    pub command: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub args: Vec<String>,
    pub path: Option<String>,
    pub variable: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub on_success: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub on_failure: Vec<String>,
}

/// Treat explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Module document error types.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// Failed to deserialize module document.
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),
}
