// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where module documents live, where their registry artifacts go,
//! and which URLs consumers use to fetch them.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// File extension of module documents.
pub const MODULE_EXTENSION: &str = "json";

/// Check if path names a module document.
pub fn is_module_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.ends_with(&format!(".{MODULE_EXTENSION}")))
}

/// Derive module name from filename of module document.
///
/// Strips the module extension from the filename. Returns [`None`] if path
/// has no UTF-8 filename.
pub fn module_name_from_path(path: impl AsRef<Path>) -> Option<String> {
    let name = path.as_ref().file_name()?.to_str()?;
    Some(
        name.strip_suffix(&format!(".{MODULE_EXTENSION}"))
            .unwrap_or(name)
            .to_owned(),
    )
}

/// Check that module name can be used as a single path component.
///
/// # Errors
///
/// - Return [`InvalidModuleName`] if name is empty, a relative component like
///   `..`, or contains a path separator.
pub fn validate_module_name(name: &str) -> Result<()> {
    if !is_path_component(name) {
        return Err(InvalidModuleName(name.to_owned()));
    }

    Ok(())
}

/// Check that module category can be used as a directory name.
///
/// # Errors
///
/// - Return [`InvalidModuleField`] under the same rules as
///   [`validate_module_name`].
pub fn validate_module_category(category: &str) -> Result<(), InvalidModuleField> {
    if !is_path_component(category) {
        return Err(InvalidModuleField {
            field: "category",
            value: category.to_owned(),
        });
    }

    Ok(())
}

/// Check that module version can be embedded in a version filename.
///
/// Empty versions are fine, since the name prefix keeps the filename intact.
///
/// # Errors
///
/// - Return [`InvalidModuleField`] if version contains a path separator.
pub fn validate_module_version(version: &str) -> Result<(), InvalidModuleField> {
    if has_separator(version) {
        return Err(InvalidModuleField {
            field: "version",
            value: version.to_owned(),
        });
    }

    Ok(())
}

fn is_path_component(value: &str) -> bool {
    !(value.is_empty() || value == "." || value == ".." || has_separator(value))
}

fn has_separator(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}

/// Relative path of module document in the published module tree.
///
/// Modules with a category live in a directory named after that category.
pub fn module_relative_path(name: &str, category: Option<&str>) -> String {
    match category {
        Some(category) => format!("{category}/{name}.{MODULE_EXTENSION}"),
        None => format!("{name}.{MODULE_EXTENSION}"),
    }
}

/// URL of module document relative to registry base URL.
pub fn module_url(name: &str, category: Option<&str>) -> String {
    format!("modules/{}", module_relative_path(name, category))
}

/// Path of version metadata file relative to registry directory.
pub fn version_file_path(name: &str, version: &str, category: Option<&str>) -> PathBuf {
    let mut path = PathBuf::from("versions");
    if let Some(category) = category {
        path.push(category);
    }
    path.push(format!("{name}-v{version}.{MODULE_EXTENSION}"));
    path
}

/// Module name cannot be used as a path component.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid module name {0:?}")]
pub struct InvalidModuleName(pub String);

/// Module field cannot be used to build a registry path.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid module {field} {value:?}")]
pub struct InvalidModuleField {
    pub field: &'static str,
    pub value: String,
}

/// Friendly result alias :3
pub type Result<T, E = InvalidModuleName> = std::result::Result<T, E>;
