// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Registry artifact output.
//!
//! Registry artifacts are handed to an [`ArtifactSink`] as they are produced.
//! The sink decides when, and if, they become visible in the registry
//! directory.
//!
//! # Staged Output
//!
//! A [`StagedSink`] writes every artifact into a hidden staging directory that
//! sits next to the registry directory, so both live on the same file system.
//! Nothing touches the registry directory until [`ArtifactSink::finish`] is
//! called. At that point the current registry directory is moved aside, the
//! staging directory is renamed into its place, and the old one is removed.
//! A build that fails midway simply drops the staging directory, leaving the
//! previous registry intact.
//!
//! # Direct Output
//!
//! A [`DirectSink`] writes straight into the registry directory. Artifacts of
//! earlier stages stay on disk if a later stage fails.

use serde::Serialize;
use std::{
    fs::{remove_dir_all, rename, write},
    path::{Path, PathBuf},
};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

/// Destination of registry artifacts.
pub trait ArtifactSink {
    /// Write value as formatted JSON artifact at path relative to registry
    /// directory.
    fn write_json<T>(&mut self, relative: &Path, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized;

    /// Make written artifacts visible in registry directory.
    ///
    /// Returns relative paths of every artifact written, in write order.
    fn finish(self) -> Result<Vec<PathBuf>>;
}

/// Write artifacts straight into registry directory.
#[derive(Debug, Clone)]
pub struct DirectSink {
    root: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectSink {
    /// Construct new direct sink over registry directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: Vec::new(),
        }
    }
}

impl ArtifactSink for DirectSink {
    fn write_json<T>(&mut self, relative: &Path, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        write_artifact(&self.root, relative, value)?;
        self.written.push(relative.to_path_buf());
        Ok(())
    }

    fn finish(self) -> Result<Vec<PathBuf>> {
        Ok(self.written)
    }
}

/// Write artifacts into staging directory, then swap it into place.
#[derive(Debug)]
pub struct StagedSink {
    target: PathBuf,
    staging: TempDir,
    written: Vec<PathBuf>,
}

impl StagedSink {
    /// Construct new staged sink for registry directory.
    ///
    /// Creates the parent of the registry directory if needed, along with a
    /// fresh staging directory inside of it.
    ///
    /// # Errors
    ///
    /// - Return [`OutputError::InvalidTarget`] if registry directory has no
    ///   usable final component.
    /// - Return [`OutputError::CreateDir`] if parent cannot be created.
    /// - Return [`OutputError::Staging`] if staging directory cannot be
    ///   created.
    pub fn new(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let name = target
            .file_name()
            .ok_or_else(|| OutputError::InvalidTarget(target.clone()))?
            .to_string_lossy()
            .into_owned();
        let parent = parent_dir(&target).to_path_buf();
        create_dir(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(&format!(".{name}.staging-"))
            .tempdir_in(&parent)
            .map_err(|err| OutputError::Staging {
                source: err,
                path: parent.clone(),
            })?;
        debug!("stage registry artifacts in {:?}", staging.path().display());

        Ok(Self {
            target,
            staging,
            written: Vec::new(),
        })
    }

    /// Path to staging directory.
    pub fn staging_path(&self) -> &Path {
        self.staging.path()
    }
}

impl ArtifactSink for StagedSink {
    fn write_json<T>(&mut self, relative: &Path, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        write_artifact(self.staging.path(), relative, value)?;
        self.written.push(relative.to_path_buf());
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn finish(self) -> Result<Vec<PathBuf>> {
        swap_into_place(self.staging.path(), &self.target)?;
        Ok(self.written)
    }
}

/// Produce every artifact without writing any of them.
#[derive(Debug, Clone, Default)]
pub struct DryRunSink {
    written: Vec<PathBuf>,
}

impl DryRunSink {
    /// Construct new dry run sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactSink for DryRunSink {
    fn write_json<T>(&mut self, relative: &Path, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let data = encode_json(relative, value)?;
        info!("would write {:?} ({} bytes)", relative.display(), data.len());
        self.written.push(relative.to_path_buf());
        Ok(())
    }

    fn finish(self) -> Result<Vec<PathBuf>> {
        Ok(self.written)
    }
}

/// Encode value as JSON with two-space indentation and a trailing newline.
///
/// # Errors
///
/// - Return [`OutputError::Encode`] if value cannot be serialized.
pub fn encode_json<T>(relative: &Path, value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut data = serde_json::to_vec_pretty(value).map_err(|err| OutputError::Encode {
        source: err,
        path: relative.to_path_buf(),
    })?;
    data.push(b'\n');
    Ok(data)
}

fn write_artifact<T>(root: &Path, relative: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let data = encode_json(relative, value)?;
    let path = root.join(relative);
    create_dir(parent_dir(&path))?;

    debug!("write {:?}", path.display());
    write(&path, data).map_err(|err| OutputError::WriteFile { source: err, path })
}

fn create_dir(path: &Path) -> Result<()> {
    mkdirp::mkdirp(path).map_err(|err| OutputError::CreateDir {
        source: err,
        path: path.to_path_buf(),
    })?;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn swap_into_place(staging: &Path, target: &Path) -> Result<()> {
    if !target.exists() {
        return rename(staging, target).map_err(|err| OutputError::Swap {
            source: err,
            path: target.to_path_buf(),
        });
    }

    let mut backup_name = target.file_name().unwrap_or_default().to_os_string();
    backup_name.push(".previous");
    let backup = parent_dir(target).join(format!(".{}", backup_name.to_string_lossy()));
    if backup.exists() {
        remove_dir_all(&backup).map_err(|err| OutputError::Swap {
            source: err,
            path: backup.clone(),
        })?;
    }

    rename(target, &backup).map_err(|err| OutputError::Swap {
        source: err,
        path: target.to_path_buf(),
    })?;

    // INVARIANT: Restore previous registry if new one cannot take its place.
    if let Err(err) = rename(staging, target) {
        if let Err(restore) = rename(&backup, target) {
            warn!(
                "failed to restore previous registry from {:?}: {restore}",
                backup.display()
            );
        }
        return Err(OutputError::Swap {
            source: err,
            path: target.to_path_buf(),
        });
    }

    if let Err(err) = remove_dir_all(&backup) {
        warn!("failed to remove previous registry {:?}: {err}", backup.display());
    }

    Ok(())
}

/// Registry output error types.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Registry directory has no usable final path component.
    #[error("invalid registry directory {:?}", .0.display())]
    InvalidTarget(PathBuf),

    /// Directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Staging directory cannot be created.
    #[error("failed to create staging directory in {:?}", path.display())]
    Staging {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Artifact cannot be serialized.
    #[error("failed to encode {:?}", path.display())]
    Encode {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// Artifact cannot be written.
    #[error("failed to write {:?}", path.display())]
    WriteFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Staged registry cannot be moved into place.
    #[error("failed to move staged registry into {:?}", path.display())]
    Swap {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = OutputError> = std::result::Result<T, E>;
