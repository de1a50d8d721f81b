// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Category catalog.
//!
//! The registry knows about a fixed set of five categories. Each one comes
//! with static display metadata that consumers use to group modules. Modules
//! may declare any category string they like, but only these five are
//! aggregated into the category definitions of the registry.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Known module category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Development,
    AiTools,
    Enterprise,
    DevOps,
    Platform,
}

impl Category {
    /// All known categories in priority order.
    pub const ALL: [Category; 5] = [
        Category::Development,
        Category::AiTools,
        Category::Enterprise,
        Category::DevOps,
        Category::Platform,
    ];

    /// Key used for category in module documents and registry artifacts.
    pub fn key(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::AiTools => "ai-tools",
            Self::Enterprise => "enterprise",
            Self::DevOps => "devops",
            Self::Platform => "platform",
        }
    }

    /// Static display metadata of category.
    pub fn info(self) -> CategoryInfo {
        match self {
            Self::Development => CategoryInfo {
                name: "Development Tools",
                description: "Programming languages, version control, and development utilities",
                icon: "🛠️",
                color: "#007ACC",
                priority: 1,
            },
            Self::AiTools => CategoryInfo {
                name: "AI Tools",
                description: "Artificial Intelligence and Machine Learning development tools",
                icon: "🤖",
                color: "#FF6B35",
                priority: 2,
            },
            Self::Enterprise => CategoryInfo {
                name: "Enterprise",
                description: "Security, compliance, and enterprise-specific configurations",
                icon: "🏢",
                color: "#6F42C1",
                priority: 3,
            },
            Self::DevOps => CategoryInfo {
                name: "DevOps",
                description: "Infrastructure, deployment, and operations tools",
                icon: "⚙️",
                color: "#28A745",
                priority: 4,
            },
            Self::Platform => CategoryInfo {
                name: "Platform",
                description: "Operating system and platform-specific configurations",
                icon: "💻",
                color: "#6C757D",
                priority: 5,
            },
        }
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == key)
            .ok_or_else(|| UnknownCategory(key.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.key())
    }
}

/// Display metadata of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub priority: u8,
}

/// Category definition as written into the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryDefinition {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub priority: u8,

    /// Sorted names of modules in category.
    pub modules: Vec<String>,
}

impl From<CategoryInfo> for CategoryDefinition {
    fn from(info: CategoryInfo) -> Self {
        Self {
            name: info.name.into(),
            description: info.description.into(),
            icon: info.icon.into(),
            color: info.color.into(),
            priority: info.priority,
            modules: Vec::new(),
        }
    }
}

/// Catalog of category definitions keyed by category key.
///
/// # Invariant
///
/// - Only contains the five known categories.
/// - Module listings are sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    definitions: BTreeMap<Category, CategoryDefinition>,
}

impl CategoryCatalog {
    /// Construct catalog of known categories with empty module listings.
    pub fn builtin() -> Self {
        let definitions = Category::ALL
            .into_iter()
            .map(|category| (category, CategoryDefinition::from(category.info())))
            .collect();

        Self { definitions }
    }

    /// Add module to category if category is known.
    ///
    /// Returns false if category is unknown, leaving catalog untouched.
    pub fn assign(&mut self, category: &str, module: impl Into<String>) -> bool {
        let Ok(category) = category.parse::<Category>() else {
            return false;
        };

        // INVARIANT: Keep module listing sorted and deduplicated on insertion.
        let Some(definition) = self.definitions.get_mut(&category) else {
            return false;
        };
        let module = module.into();
        if let Err(position) = definition.modules.binary_search(&module) {
            definition.modules.insert(position, module);
        }

        true
    }

    /// Category definition of known category.
    pub fn get(&self, category: Category) -> Option<&CategoryDefinition> {
        self.definitions.get(&category)
    }

    /// Number of categories in catalog.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if catalog has no categories.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Number of categories with at least one module.
    pub fn active(&self) -> usize {
        self.definitions
            .values()
            .filter(|definition| !definition.modules.is_empty())
            .count()
    }

    /// Iterate over category definitions by category key.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CategoryDefinition)> {
        self.definitions
            .iter()
            .map(|(category, definition)| (category.key(), definition))
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Category key is not one of the known categories.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown category {0:?}")]
pub struct UnknownCategory(pub String);
