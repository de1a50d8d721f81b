// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Category definition generation.

use crate::{
    category::{CategoryCatalog, CategoryDefinition},
    scan::ModuleSet,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Schema version of categories document.
pub const CATEGORIES_VERSION: &str = "1.0.0";

/// Category definitions document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoriesDocument {
    pub version: String,
    pub categories: BTreeMap<String, CategoryDefinition>,
    pub metadata: CategoryMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryMetadata {
    pub total_categories: usize,

    /// Categories with at least one module.
    pub active_categories: usize,

    pub last_updated: String,
}

impl CategoriesDocument {
    /// Generate category definitions by filling catalog with scanned modules.
    ///
    /// Modules whose category is not part of the catalog are left out.
    pub fn generate(
        mut catalog: CategoryCatalog,
        modules: &ModuleSet,
        generated_at: impl Into<String>,
    ) -> Self {
        for module in modules.modules() {
            let Some(category) = module.category() else {
                continue;
            };

            if !catalog.assign(category, module.name.as_str()) {
                warn!(
                    "module {:?} has unknown category {category:?}, leaving it out of category definitions",
                    module.name
                );
            }
        }

        Self {
            version: CATEGORIES_VERSION.into(),
            metadata: CategoryMetadata {
                total_categories: catalog.len(),
                active_categories: catalog.active(),
                last_updated: generated_at.into(),
            },
            categories: catalog
                .iter()
                .map(|(key, definition)| (key.to_owned(), definition.clone()))
                .collect(),
        }
    }
}
