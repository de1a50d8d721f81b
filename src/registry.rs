// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Registry generation.
//!
//! A __registry__ is the set of artifacts derived from a directory of module
//! documents, ready to be served to the profile CLI. Every build is a full
//! scan of the module directory and a full regeneration of the registry.
//! Nothing carries over between builds except what is already on disk.
//!
//! # Registry Layout
//!
//! ```text
//! registry/
//! ├── index.json
//! ├── categories.json
//! └── versions/
//!     ├── development/
//!     │   └── go-v1.0.0.json
//!     └── misc-v0.1.0.json
//! ```
//!
//! The index summarizes every module. The category definitions group modules
//! under the five known categories. The version records describe each
//! module version along with a digest of its document.
//!
//! # Build Stages
//!
//! A build runs four stages strictly in order: scan, index, categories, and
//! versions. The first failure aborts the build. Whether artifacts of earlier
//! stages survive a failure depends on the [`OutputMode`]. Staged output
//! leaves the registry directory untouched, while direct output keeps
//! whatever was already written.
//!
//! # See Also
//!
//! 1. [`RegistryIndex`]
//! 2. [`CategoriesDocument`]
//! 3. [`VersionMetadata`]

pub mod categories;
pub mod index;
pub mod output;
pub mod versions;

use crate::{
    category::CategoryCatalog,
    checksum::ChecksumError,
    config::{BuilderConfig, OutputMode},
    registry::{
        categories::CategoriesDocument,
        index::RegistryIndex,
        output::{ArtifactSink, DirectSink, DryRunSink, OutputError, StagedSink},
        versions::VersionMetadata,
    },
    scan::{scan_modules, ModuleSet, ScanError},
};

use chrono::{DateTime, SecondsFormat, Utc};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// File name of registry index.
pub const INDEX_FILE: &str = "index.json";

/// File name of category definitions.
pub const CATEGORIES_FILE: &str = "categories.json";

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of modules in registry.
    pub modules: usize,

    /// Build timestamp recorded in every artifact.
    pub generated_at: String,

    /// Artifacts produced, relative to registry directory.
    pub artifacts: Vec<PathBuf>,
}

/// Registry builder.
///
/// Turns a directory of module documents into registry artifacts according
/// to a [`BuilderConfig`]. The builder itself holds no state between builds.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    config: BuilderConfig,
    catalog: CategoryCatalog,
}

impl RegistryBuilder {
    /// Construct new registry builder with builtin category catalog.
    pub fn new(config: BuilderConfig) -> Self {
        Self::with_catalog(config, CategoryCatalog::builtin())
    }

    /// Construct new registry builder with target category catalog.
    pub fn with_catalog(config: BuilderConfig, catalog: CategoryCatalog) -> Self {
        Self { config, catalog }
    }

    /// Configuration of builder.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build registry stamped with current time.
    ///
    /// # Errors
    ///
    /// - Return [`RegistryError`] naming the stage that failed.
    pub fn build(&self, bar: &ProgressBar) -> Result<BuildReport> {
        self.build_at(Utc::now(), bar)
    }

    /// Build registry stamped with target time.
    ///
    /// Scans the module directory before touching any output, so a bad
    /// module document never leaves anything behind.
    ///
    /// # Errors
    ///
    /// - Return [`RegistryError`] naming the stage that failed.
    #[instrument(skip(self, bar), level = "debug")]
    pub fn build_at(&self, generated_at: DateTime<Utc>, bar: &ProgressBar) -> Result<BuildReport> {
        let modules = self.scan()?;
        let registry_dir = &self.config.registry_dir;

        match self.config.output {
            OutputMode::Staged => {
                let sink = StagedSink::new(registry_dir).map_err(RegistryError::Prepare)?;
                self.generate(&modules, sink, generated_at, bar)
            }
            OutputMode::Direct => {
                let sink = DirectSink::new(registry_dir);
                self.generate(&modules, sink, generated_at, bar)
            }
        }
    }

    /// Run every build stage without writing anything.
    ///
    /// # Errors
    ///
    /// - Return [`RegistryError`] naming the stage that failed.
    pub fn dry_run(&self, bar: &ProgressBar) -> Result<BuildReport> {
        let modules = self.scan()?;
        self.generate(&modules, DryRunSink::new(), Utc::now(), bar)
    }

    fn scan(&self) -> Result<ModuleSet> {
        info!(
            "scan modules directory {:?}",
            self.config.modules_dir.display()
        );
        let modules = scan_modules(&self.config.modules_dir, self.config.on_duplicate)
            .map_err(RegistryError::Scan)?;
        info!("found {} modules", modules.len());

        Ok(modules)
    }

    /// Generate every registry artifact into target sink.
    ///
    /// # Errors
    ///
    /// - Return [`RegistryError`] naming the stage that failed.
    pub fn generate<S>(
        &self,
        modules: &ModuleSet,
        mut sink: S,
        generated_at: DateTime<Utc>,
        bar: &ProgressBar,
    ) -> Result<BuildReport>
    where
        S: ArtifactSink,
    {
        let generated_at = format_timestamp(generated_at);

        info!("generate registry index");
        generate_index(modules, &self.config.base_url, &generated_at, &mut sink)
            .map_err(RegistryError::Index)?;

        info!("generate category definitions");
        generate_categories(self.catalog.clone(), modules, &generated_at, &mut sink)
            .map_err(RegistryError::Categories)?;

        info!("generate version metadata");
        generate_versions(modules, &generated_at, &mut sink, bar)
            .map_err(RegistryError::Versions)?;

        let artifacts = sink.finish().map_err(RegistryError::Commit)?;
        info!(
            "registry of {} modules written to {:?}",
            modules.len(),
            self.config.registry_dir.display()
        );

        Ok(BuildReport {
            modules: modules.len(),
            generated_at,
            artifacts,
        })
    }
}

/// Format build timestamp as RFC 3339 in UTC to the second.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[instrument(skip_all, level = "debug")]
fn generate_index(
    modules: &ModuleSet,
    base_url: &str,
    generated_at: &str,
    sink: &mut impl ArtifactSink,
) -> Result<(), ArtifactError> {
    let index = RegistryIndex::generate(modules, base_url, generated_at)?;
    sink.write_json(Path::new(INDEX_FILE), &index)?;
    Ok(())
}

#[instrument(skip_all, level = "debug")]
fn generate_categories(
    catalog: CategoryCatalog,
    modules: &ModuleSet,
    generated_at: &str,
    sink: &mut impl ArtifactSink,
) -> Result<(), OutputError> {
    let document = CategoriesDocument::generate(catalog, modules, generated_at);
    sink.write_json(Path::new(CATEGORIES_FILE), &document)
}

#[instrument(skip_all, level = "debug")]
fn generate_versions(
    modules: &ModuleSet,
    generated_at: &str,
    sink: &mut impl ArtifactSink,
    bar: &ProgressBar,
) -> Result<(), ArtifactError> {
    bar.set_length(modules.len() as u64);
    bar.set_position(0);

    for (name, scanned) in modules.iter() {
        bar.set_message(name.to_owned());
        let record = VersionMetadata::generate(scanned, generated_at)?;
        let path = record.relative_path();
        debug!("write version metadata of {name:?} to {:?}", path.display());
        sink.write_json(&path, &record)?;
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(())
}

/// Failure to produce a single artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Registry build error types.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Module directory cannot be scanned.
    #[error("failed to scan modules")]
    Scan(#[source] ScanError),

    /// Output location cannot be prepared.
    #[error("failed to prepare registry output")]
    Prepare(#[source] OutputError),

    /// Registry index cannot be generated.
    #[error("failed to generate index")]
    Index(#[source] ArtifactError),

    /// Category definitions cannot be generated.
    #[error("failed to generate categories")]
    Categories(#[source] OutputError),

    /// Version metadata cannot be generated.
    #[error("failed to generate versions")]
    Versions(#[source] ArtifactError),

    /// Finished artifacts cannot be moved into registry directory.
    #[error("failed to publish registry")]
    Commit(#[source] OutputError),
}

/// Friendly result alias :3
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
