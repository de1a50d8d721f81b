// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Registry index generation.
//!
//! The index is the entry point consumers read first. It summarizes every
//! module in the registry: where to fetch it, how to verify it, and which tags
//! to discover it by.

use crate::{
    checksum::{ChecksumError, FileDigest},
    path::module_url,
    scan::ModuleSet,
};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Schema version of index document.
pub const INDEX_VERSION: &str = "1.0.0";

/// Registry index document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistryIndex {
    pub version: String,
    pub last_updated: String,
    pub base_url: String,

    /// Sorted distinct categories declared by modules, known or not.
    pub categories: Vec<String>,

    pub modules: BTreeMap<String, ModuleMetadata>,
    pub statistics: Statistics,
}

/// Index entry of a single module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleMetadata {
    pub latest: String,

    /// Every published version. Only the current one is tracked.
    pub versions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub description: String,
    pub url: String,
    pub checksum: String,
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    pub tags: Vec<String>,
}

/// Summary statistics of registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Statistics {
    pub total_modules: usize,

    /// Always zero. Download tracking happens outside of the registry.
    pub total_downloads: u64,

    /// Module count per declared category.
    ///
    /// Modules without a category are not counted here.
    pub categories_count: BTreeMap<String, usize>,
}

impl RegistryIndex {
    /// Generate index for set of scanned modules.
    ///
    /// # Errors
    ///
    /// - Return [`ChecksumError`] if a module file cannot be digested.
    pub fn generate(
        modules: &ModuleSet,
        base_url: impl Into<String>,
        generated_at: impl Into<String>,
    ) -> Result<Self, ChecksumError> {
        let mut categories = BTreeSet::new();
        let mut entries = BTreeMap::new();
        let mut statistics = Statistics {
            total_modules: modules.len(),
            ..Default::default()
        };

        for (name, scanned) in modules.iter() {
            let module = &scanned.module;
            let digest = FileDigest::of_file(&scanned.source)?;

            if let Some(category) = module.category() {
                categories.insert(category.to_owned());
                *statistics
                    .categories_count
                    .entry(category.to_owned())
                    .or_default() += 1;
            }

            entries.insert(
                name.to_owned(),
                ModuleMetadata {
                    latest: module.version.clone(),
                    versions: vec![module.version.clone()],
                    category: module.category().map(str::to_owned),
                    description: module.description.clone(),
                    url: module_url(name, module.category()),
                    checksum: digest.checksum,
                    size: digest.size,
                    author: module.author().map(str::to_owned),
                    license: module.license().map(str::to_owned),
                    tags: module.tags(),
                },
            );
        }

        Ok(Self {
            version: INDEX_VERSION.into(),
            last_updated: generated_at.into(),
            base_url: base_url.into(),
            categories: categories.into_iter().collect(),
            modules: entries,
            statistics,
        })
    }
}
