// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version metadata generation.
//!
//! Each module version gets its own metadata record under
//! `versions/<category>/<name>-v<version>.json`. The registry does not track
//! release history. The changelog is synthesized as a single "added" entry,
//! breaking changes are always empty, and the timestamp is the build time,
//! which is why it is labeled `generated_at` rather than a release date.

use crate::{
    checksum::{ChecksumError, FileDigest},
    module::Dependencies,
    path::{module_url, version_file_path},
    scan::ScannedModule,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// MIME type of published module documents.
pub const MODULE_MIME_TYPE: &str = "application/json";

/// Metadata record of a single module version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionMetadata {
    pub module: String,
    pub version: String,

    /// Time of registry build that produced record.
    pub generated_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub changelog: Vec<ChangelogEntry>,
    pub breaking_changes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Dependencies>,

    pub compatibility: Compatibility,
    pub file_info: FileInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChangelogEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Compatibility {
    pub platforms: Vec<String>,
    pub shells: Vec<String>,
}

/// Where to fetch module document and how to verify it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileInfo {
    pub url: String,
    pub checksum: String,
    pub size: u64,
    pub mime_type: String,
}

impl VersionMetadata {
    /// Generate version record of scanned module.
    ///
    /// # Errors
    ///
    /// - Return [`ChecksumError`] if module file cannot be digested.
    pub fn generate(
        scanned: &ScannedModule,
        generated_at: impl Into<String>,
    ) -> Result<Self, ChecksumError> {
        let module = &scanned.module;
        let digest = FileDigest::of_file(&scanned.source)?;

        Ok(Self {
            module: module.name.clone(),
            version: module.version.clone(),
            generated_at: generated_at.into(),
            category: module.category().map(str::to_owned),
            changelog: vec![ChangelogEntry {
                kind: "added".into(),
                description: format!("Initial {} module", module.name),
            }],
            breaking_changes: Vec::new(),
            dependencies: module.dependencies.clone(),
            compatibility: Compatibility {
                platforms: module.platforms.clone(),
                shells: module.shells.clone(),
            },
            file_info: FileInfo {
                url: module_url(&module.name, module.category()),
                checksum: digest.checksum,
                size: digest.size,
                mime_type: MODULE_MIME_TYPE.into(),
            },
            author: module.author().map(str::to_owned),
            license: module.license().map(str::to_owned),
            tags: module.tags(),
        })
    }

    /// Path of record relative to registry directory.
    pub fn relative_path(&self) -> PathBuf {
        version_file_path(&self.module, &self.version, self.category.as_deref())
    }
}
