// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Module directory scanning.
//!
//! The scanner walks a module directory recursively and loads every module
//! document it finds into a [`ModuleSet`] keyed by module name.
//!
//! # Walk Order
//!
//! Directories are walked depth-first with entries visited in lexical
//! filename order. Hidden files and ignore files get no special treatment.
//! The order matters when two documents resolve to the same module name,
//! because the [`DuplicatePolicy`] decides what happens to the one visited
//! last.

use crate::{
    config::DuplicatePolicy,
    module::{Module, ModuleError},
    path::{
        is_module_file, module_name_from_path, validate_module_category, validate_module_name,
        validate_module_version, InvalidModuleField, InvalidModuleName,
    },
};

use ignore::WalkBuilder;
use std::{
    collections::{btree_map, BTreeMap},
    fs::read_to_string,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument, warn};

/// Module loaded from disk along with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedModule {
    pub module: Module,
    pub source: PathBuf,
}

/// Set of scanned modules keyed by module name.
///
/// # Invariant
///
/// - Exactly one entry per module name.
/// - Every module has a non-empty name matching its key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModuleSet {
    modules: BTreeMap<String, ScannedModule>,
}

impl ModuleSet {
    /// Construct new empty module set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert scanned module by name according to duplicate policy.
    ///
    /// # Errors
    ///
    /// - Return [`ScanError::DuplicateModule`] if name is already taken and
    ///   policy is [`DuplicatePolicy::Error`].
    pub fn insert(&mut self, scanned: ScannedModule, policy: DuplicatePolicy) -> Result<()> {
        match self.modules.entry(scanned.module.name.clone()) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(scanned);
            }
            btree_map::Entry::Occupied(mut entry) => match policy {
                DuplicatePolicy::LastWins => {
                    warn!(
                        "module {:?} in {:?} replaces module of same name in {:?}",
                        entry.key(),
                        scanned.source.display(),
                        entry.get().source.display()
                    );
                    entry.insert(scanned);
                }
                DuplicatePolicy::Error => {
                    return Err(ScanError::DuplicateModule {
                        name: entry.key().clone(),
                        first: entry.get().source.clone(),
                        second: scanned.source,
                    });
                }
            },
        }

        Ok(())
    }

    /// Scanned module by name.
    pub fn get(&self, name: &str) -> Option<&ScannedModule> {
        self.modules.get(name)
    }

    /// Number of modules in set.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if set has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterate over modules in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScannedModule)> {
        self.modules
            .iter()
            .map(|(name, scanned)| (name.as_str(), scanned))
    }

    /// Iterate over modules in name order without their source paths.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values().map(|scanned| &scanned.module)
    }
}

/// Scan module directory for module documents.
///
/// Every file whose name ends in the module extension is parsed as a module.
/// Modules without a name take the filename minus its extension.
///
/// # Errors
///
/// - Return [`ScanError::MissingModulesDir`] if directory does not exist.
/// - Return [`ScanError::Walk`] if directory cannot be traversed.
/// - Return [`ScanError::ReadModule`] if a module file cannot be read.
/// - Return [`ScanError::ParseModule`] if a module file is malformed.
/// - Return [`ScanError::InvalidName`] if a module name is unusable.
/// - Return [`ScanError::InvalidField`] if a module category or version is
///   unusable.
/// - Return [`ScanError::DuplicateModule`] on name collision when the
///   policy forbids it.
#[instrument(skip(modules_dir), level = "debug")]
pub fn scan_modules(modules_dir: impl AsRef<Path>, policy: DuplicatePolicy) -> Result<ModuleSet> {
    let modules_dir = modules_dir.as_ref();
    if !modules_dir.is_dir() {
        return Err(ScanError::MissingModulesDir(modules_dir.to_path_buf()));
    }

    let walker = WalkBuilder::new(modules_dir)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut modules = ModuleSet::new();
    for entry in walker {
        let entry = entry?;
        let is_file = entry.file_type().is_some_and(|kind| !kind.is_dir());
        if !is_file || !is_module_file(entry.path()) {
            continue;
        }

        debug!("load module {:?}", entry.path().display());
        let module = load_module(entry.path())?;
        modules.insert(
            ScannedModule {
                module,
                source: entry.path().to_path_buf(),
            },
            policy,
        )?;
    }

    Ok(modules)
}

/// Load single module document.
///
/// Falls back to filename for module name if document does not declare one.
///
/// # Errors
///
/// - Return [`ScanError::ReadModule`] if file cannot be read.
/// - Return [`ScanError::ParseModule`] if file is malformed.
/// - Return [`ScanError::InvalidName`] if module name is unusable.
/// - Return [`ScanError::InvalidField`] if module category or version is
///   unusable.
pub fn load_module(path: impl AsRef<Path>) -> Result<Module> {
    let path = path.as_ref();
    let content = read_to_string(path).map_err(|err| ScanError::ReadModule {
        source: err,
        path: path.to_path_buf(),
    })?;

    let mut module: Module = content.parse().map_err(|err| ScanError::ParseModule {
        source: err,
        path: path.to_path_buf(),
    })?;

    // INVARIANT: Use filename as module name if document lacks one.
    if module.name.is_empty() {
        module.name = module_name_from_path(path).unwrap_or_default();
    }

    validate_module_name(&module.name).map_err(|err| ScanError::InvalidName {
        source: err,
        path: path.to_path_buf(),
    })?;

    // INVARIANT: Category and version never steer version files out of the registry.
    module
        .category()
        .map_or(Ok(()), validate_module_category)
        .and_then(|_| validate_module_version(&module.version))
        .map_err(|err| ScanError::InvalidField {
            source: err,
            path: path.to_path_buf(),
        })?;

    Ok(module)
}

/// Module scanning error types.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Module directory does not exist.
    #[error("module directory {:?} does not exist", .0.display())]
    MissingModulesDir(PathBuf),

    /// Module directory cannot be traversed.
    #[error(transparent)]
    Walk(#[from] ignore::Error),

    /// Module document cannot be read.
    #[error("failed to read module {:?}", path.display())]
    ReadModule {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Module document is malformed.
    #[error("failed to parse module {:?}", path.display())]
    ParseModule {
        #[source]
        source: ModuleError,
        path: PathBuf,
    },

    /// Module name cannot be used in registry.
    #[error("module {:?} has unusable name", path.display())]
    InvalidName {
        #[source]
        source: InvalidModuleName,
        path: PathBuf,
    },

    /// Module category or version cannot be used in registry.
    #[error("module {:?} has unusable field", path.display())]
    InvalidField {
        #[source]
        source: InvalidModuleField,
        path: PathBuf,
    },

    /// Two module documents resolve to the same module name.
    #[error(
        "module {name:?} is defined by both {:?} and {:?}",
        first.display(),
        second.display()
    )]
    DuplicateModule {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ScanError> = std::result::Result<T, E>;
