// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{BuildKind, ModuleFixture, GENERATED_AT};

use anyhow::Result;
use indicatif::ProgressBar;
use indoc::indoc;
use pretty_assertions::assert_eq;
use profile_registry::{
    checksum::FileDigest,
    registry::{
        categories::CategoriesDocument, index::RegistryIndex, versions::VersionMetadata,
        RegistryError,
    },
    scan::ScanError,
    RegistryBuilder,
};
use serde_json::Value;
use std::collections::BTreeSet;

const GO_MODULE: &str =
    r#"{"name":"go","version":"1.0.0","category":"development","platforms":["linux"],"shells":["bash"]}"#;

#[test]
fn single_module_registry() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("development/go.json", GO_MODULE)?;
    fixture.build(BuildKind::default())?;

    let index: RegistryIndex = fixture.read_artifact("index.json")?;
    assert_eq!(index.statistics.total_modules, 1);
    assert_eq!(index.categories, vec!["development"]);
    assert_eq!(index.modules["go"].tags, vec!["bash", "development", "go", "linux"]);
    assert_eq!(index.modules["go"].url, "modules/development/go.json");
    assert_eq!(index.last_updated, GENERATED_AT);
    assert_eq!(index.base_url, "https://registry.example.org");

    let categories: CategoriesDocument = fixture.read_artifact("categories.json")?;
    assert_eq!(categories.categories["development"].modules, vec!["go"]);
    assert_eq!(categories.metadata.active_categories, 1);
    assert_eq!(categories.metadata.total_categories, 5);

    let version: VersionMetadata = fixture.read_artifact("versions/development/go-v1.0.0.json")?;
    assert_eq!(version.generated_at, GENERATED_AT);
    assert_eq!(version.changelog[0].description, "Initial go module");
    assert!(version.breaking_changes.is_empty());

    Ok(())
}

#[test]
fn rebuild_differs_only_in_timestamps() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("development/go.json", GO_MODULE)?;
    fixture.add_module("devops/docker.json", indoc! {r#"
        {
          "name": "docker",
          "version": "24.0.0",
          "category": "devops",
          "platforms": ["darwin", "linux"],
          "shells": ["zsh", "bash"],
          "dependencies": { "commands": ["docker"] }
        }
    "#})?;
    fixture.add_module("misc.json", r#"{"version":"0.1.0"}"#)?;

    let builder = RegistryBuilder::new(fixture.config(BuildKind::default()));
    let strip = |mut value: Value| {
        if let Some(object) = value.as_object_mut() {
            object.remove("last_updated");
            if let Some(metadata) = object.get_mut("metadata").and_then(Value::as_object_mut) {
                metadata.remove("last_updated");
            }
        }
        value
    };

    builder.build(&ProgressBar::hidden())?;
    let first_index = strip(fixture.read_artifact("index.json")?);
    let first_categories = strip(fixture.read_artifact("categories.json")?);

    builder.build(&ProgressBar::hidden())?;
    let second_index = strip(fixture.read_artifact("index.json")?);
    let second_categories = strip(fixture.read_artifact("categories.json")?);

    assert_eq!(first_index, second_index);
    assert_eq!(first_categories, second_categories);

    Ok(())
}

#[test]
fn same_timestamp_gives_identical_bytes() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("development/go.json", GO_MODULE)?;

    fixture.build(BuildKind::default())?;
    let first = fixture.read_artifact_text("index.json")?;
    fixture.build(BuildKind::default())?;
    let second = fixture.read_artifact_text("index.json")?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn checksum_tracks_bytes_on_disk() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    let path = fixture.add_module("development/go.json", GO_MODULE)?;
    fixture.build(BuildKind::default())?;

    let index: RegistryIndex = fixture.read_artifact("index.json")?;
    let expect = FileDigest::of_bytes(GO_MODULE.as_bytes());
    assert_eq!(index.modules["go"].checksum, expect.checksum);
    assert_eq!(index.modules["go"].size, expect.size);

    let version: VersionMetadata = fixture.read_artifact("versions/development/go-v1.0.0.json")?;
    assert_eq!(version.file_info.checksum, expect.checksum);
    assert_eq!(version.file_info.mime_type, "application/json");

    // Same document, different whitespace.
    std::fs::write(&path, format!("{GO_MODULE}\n"))?;
    fixture.build(BuildKind::default())?;
    let index: RegistryIndex = fixture.read_artifact("index.json")?;
    assert_ne!(index.modules["go"].checksum, expect.checksum);
    assert_eq!(index.modules["go"].size, expect.size + 1);

    Ok(())
}

#[test]
fn categories_agree_with_index() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("development/go.json", GO_MODULE)?;
    fixture.add_module("development/rust.json", r#"{"name":"rust","version":"1.80.0","category":"development"}"#)?;
    fixture.add_module("ai-tools/ollama.json", r#"{"name":"ollama","version":"0.3.0","category":"ai-tools"}"#)?;
    fixture.add_module("enterprise/vault.json", r#"{"name":"vault","version":"1.15.0","category":"enterprise"}"#)?;
    fixture.add_module("gaming/steam.json", r#"{"name":"steam","version":"1.0.0","category":"gaming"}"#)?;
    fixture.build(BuildKind::default())?;

    let index: RegistryIndex = fixture.read_artifact("index.json")?;
    let categories: CategoriesDocument = fixture.read_artifact("categories.json")?;

    let listed = categories
        .categories
        .values()
        .flat_map(|definition| definition.modules.iter().cloned())
        .collect::<BTreeSet<_>>();
    let known = index
        .modules
        .iter()
        .filter(|(_, metadata)| {
            metadata
                .category
                .as_ref()
                .is_some_and(|category| categories.categories.contains_key(category))
        })
        .map(|(name, _)| name.clone())
        .collect::<BTreeSet<_>>();

    assert_eq!(listed, known);
    assert_eq!(index.categories, vec!["ai-tools", "development", "enterprise", "gaming"]);
    assert!(index.modules.contains_key("steam"));
    assert!(!categories.categories.contains_key("gaming"));
    assert_eq!(categories.metadata.active_categories, 3);

    Ok(())
}

#[test]
fn duplicate_names_last_visited_wins() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("a/tool.json", r#"{"name":"tool","version":"1.0.0","description":"first"}"#)?;
    fixture.add_module("b/tool.json", r#"{"name":"tool","version":"2.0.0","description":"second"}"#)?;
    fixture.build(BuildKind::default())?;

    let index: RegistryIndex = fixture.read_artifact("index.json")?;
    assert_eq!(index.statistics.total_modules, 1);
    assert_eq!(index.modules.len(), 1);
    assert_eq!(index.modules["tool"].description, "second");
    assert_eq!(index.modules["tool"].latest, "2.0.0");

    Ok(())
}

#[test]
fn duplicate_names_rejected_when_strict() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("a/tool.json", r#"{"name":"tool","version":"1.0.0"}"#)?;
    fixture.add_module("b/tool.json", r#"{"name":"tool","version":"2.0.0"}"#)?;

    let result = fixture.build(BuildKind::Strict);
    let error = result.err().and_then(|err| err.downcast::<RegistryError>().ok());
    assert!(matches!(
        error,
        Some(RegistryError::Scan(ScanError::DuplicateModule { .. }))
    ));
    assert!(!fixture.registry_dir().exists());

    Ok(())
}

#[test]
fn invalid_json_aborts_before_any_output() -> Result<()> {
    for kind in [BuildKind::Staged, BuildKind::Direct] {
        let fixture = ModuleFixture::new()?;
        fixture.add_module("development/go.json", GO_MODULE)?;
        fixture.add_module("development/broken.json", r#"{"name": "broken", "version": }"#)?;

        let result = fixture.build(kind);
        assert!(result.is_err(), "{kind:?} build should fail");
        assert!(!fixture.registry_dir().exists(), "{kind:?} build wrote output");
    }

    Ok(())
}

#[test]
fn invalid_json_keeps_previous_registry() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("development/go.json", GO_MODULE)?;
    fixture.build(BuildKind::default())?;
    let before = fixture.read_artifact_text("index.json")?;

    fixture.add_module("development/broken.json", "{")?;
    assert!(fixture.build(BuildKind::default()).is_err());
    assert_eq!(fixture.read_artifact_text("index.json")?, before);

    Ok(())
}

#[test]
fn uncategorized_module() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("development/go.json", GO_MODULE)?;
    fixture.add_module("misc.json", r#"{"version":"0.1.0","platforms":["linux"]}"#)?;
    let report = fixture.build(BuildKind::default())?;

    let index: RegistryIndex = fixture.read_artifact("index.json")?;
    assert!(index.modules.contains_key("misc"));
    assert_eq!(index.modules["misc"].category, None);
    assert_eq!(index.modules["misc"].url, "modules/misc.json");
    assert_eq!(index.modules["misc"].tags, vec!["linux", "misc"]);
    assert_eq!(index.categories, vec!["development"]);
    assert!(!index.statistics.categories_count.contains_key(""));

    let categories: CategoriesDocument = fixture.read_artifact("categories.json")?;
    assert!(categories
        .categories
        .values()
        .all(|definition| !definition.modules.contains(&"misc".to_owned())));

    assert!(report
        .artifacts
        .contains(&std::path::PathBuf::from("versions/misc-v0.1.0.json")));
    let version: VersionMetadata = fixture.read_artifact("versions/misc-v0.1.0.json")?;
    assert_eq!(version.category, None);

    Ok(())
}

#[test]
fn empty_module_directory() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    let report = fixture.build(BuildKind::Direct)?;
    assert_eq!(report.modules, 0);

    let index: RegistryIndex = fixture.read_artifact("index.json")?;
    assert!(index.modules.is_empty());
    assert!(index.categories.is_empty());

    let categories: CategoriesDocument = fixture.read_artifact("categories.json")?;
    assert_eq!(categories.metadata.active_categories, 0);

    Ok(())
}

#[test]
fn artifacts_use_two_space_indent() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("development/go.json", GO_MODULE)?;
    fixture.build(BuildKind::default())?;

    let index = fixture.read_artifact_text("index.json")?;
    assert!(index.starts_with("{\n  \"version\": \"1.0.0\",\n"));
    assert!(index.ends_with("}\n"));

    Ok(())
}

#[test]
fn escaping_category_writes_nothing() -> Result<()> {
    for kind in [BuildKind::Staged, BuildKind::Direct] {
        let fixture = ModuleFixture::new()?;
        fixture.add_module(
            "evil.json",
            r#"{"name":"evil","version":"1.0.0","category":"../../escaped"}"#,
        )?;

        let result = fixture.build(kind);
        let error = result.err().and_then(|err| err.downcast::<RegistryError>().ok());
        assert!(
            matches!(error, Some(RegistryError::Scan(ScanError::InvalidField { .. }))),
            "{kind:?} build accepted escaping category"
        );
        assert!(!fixture.registry_dir().exists());
        assert!(!fixture.modules_dir().join("../escaped").exists());
    }

    Ok(())
}

#[test]
fn null_and_partial_fields_still_build() -> Result<()> {
    let fixture = ModuleFixture::new()?;
    fixture.add_module("development/go.json", indoc! {r#"
        {
          "name": "go",
          "version": "1.0.0",
          "description": null,
          "category": "development",
          "platforms": null,
          "shells": ["bash"],
          "environment": [{ "name": "EDITOR" }]
        }
    "#})?;
    fixture.build(BuildKind::default())?;

    let index: RegistryIndex = fixture.read_artifact("index.json")?;
    assert_eq!(index.modules["go"].description, "");
    assert_eq!(index.modules["go"].tags, vec!["bash", "development", "go"]);

    Ok(())
}
