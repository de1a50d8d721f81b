// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use profile_registry::{BuilderConfig, DuplicatePolicy, OutputMode, RegistryBuilder};

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compile shell profile modules into a registry.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "registry-builder [options]",
    version
)]
struct Cli {
    /// Directory to scan for module documents [default: ./modules].
    #[arg(long, value_name = "path")]
    pub modules_dir: Option<PathBuf>,

    /// Directory to write registry artifacts into [default: ./registry].
    #[arg(long, value_name = "path")]
    pub registry_dir: Option<PathBuf>,

    /// Base URL recorded in registry index [default: https://registry.go-profile.dev].
    #[arg(long, value_name = "url")]
    pub base_url: Option<String>,

    /// Configuration file to read settings from.
    #[arg(short, long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// What to do when two module documents share a name.
    #[arg(long, value_enum, value_name = "policy")]
    pub on_duplicate: Option<DuplicatePolicy>,

    /// How registry artifacts reach the registry directory.
    #[arg(long, value_enum, value_name = "mode")]
    pub output_mode: Option<OutputMode>,

    /// Run every stage without writing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Cli {
    fn run(self) -> Result<()> {
        let dry_run = self.dry_run;
        let builder = RegistryBuilder::new(self.into_config()?);
        let bar = progress_bar()?;

        let report = if dry_run {
            builder.dry_run(&bar)?
        } else {
            builder.build(&bar)?
        };

        info!(
            "registry generation completed: {} modules, {} artifacts, generated at {}",
            report.modules,
            report.artifacts.len(),
            report.generated_at
        );

        Ok(())
    }

    fn into_config(self) -> Result<BuilderConfig> {
        let mut config = match self.config {
            Some(path) => BuilderConfig::load(path)?,
            None => BuilderConfig::default(),
        };

        // INVARIANT: Flags always override configuration file.
        if let Some(modules_dir) = self.modules_dir {
            config.modules_dir = modules_dir;
        }
        if let Some(registry_dir) = self.registry_dir {
            config.registry_dir = registry_dir;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(policy) = self.on_duplicate {
            config.on_duplicate = policy;
        }
        if let Some(output) = self.output_mode {
            config.output = output;
        }

        Ok(config)
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<40}  [{wide_bar:.yellow/blue}] {pos}/{len}",
    )?
    .progress_chars("=> ");
    Ok(ProgressBar::new(0).with_style(style))
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs::write;

    const CONFIG: &str = indoc! {r#"
        modules_dir = "/srv/profiles/modules"
        registry_dir = "/srv/profiles/registry"
        base_url = "https://registry.example.org"
        on_duplicate = "error"
        output = "direct"
    "#};

    #[test]
    fn flags_override_config_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("registry.toml");
        write(&path, CONFIG)?;

        let path = path.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "registry-builder",
            "--config",
            path.as_str(),
            "--registry-dir",
            "/tmp/out",
            "--base-url",
            "https://mirror.example.org",
            "--on-duplicate",
            "last-wins",
        ])?;

        let expect = BuilderConfig {
            modules_dir: "/srv/profiles/modules".into(),
            registry_dir: "/tmp/out".into(),
            base_url: "https://mirror.example.org".into(),
            on_duplicate: DuplicatePolicy::LastWins,
            output: OutputMode::Direct,
        };
        assert_eq!(cli.into_config()?, expect);

        Ok(())
    }

    #[test]
    fn defaults_without_config_file() -> Result<()> {
        let cli = Cli::try_parse_from(["registry-builder", "--output-mode", "direct"])?;

        let expect = BuilderConfig {
            output: OutputMode::Direct,
            ..BuilderConfig::default()
        };
        assert_eq!(cli.into_config()?, expect);

        Ok(())
    }
}
