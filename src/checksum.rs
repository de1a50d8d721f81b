// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Content digests of module files.
//!
//! Every module in the registry is published with a digest of its exact
//! on-disk bytes, so consumers can verify what they download. Digests are a
//! pure function of file content: whitespace changes alter the digest.

use sha2::{Digest, Sha256};
use std::{
    fs::read,
    path::{Path, PathBuf},
};

/// Digest and byte size of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// Digest rendered as `sha256:<hex>`.
    pub checksum: String,

    /// Raw byte length of content.
    pub size: u64,
}

impl FileDigest {
    /// Compute digest of raw bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);

        Self {
            checksum: format!("sha256:{:x}", hasher.finalize()),
            size: data.len() as u64,
        }
    }

    /// Compute digest of file content at target path.
    ///
    /// # Errors
    ///
    /// - Return [`ChecksumError::ReadFile`] if file cannot be read.
    pub fn of_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = read(path.as_ref()).map_err(|err| ChecksumError::ReadFile {
            source: err,
            path: path.as_ref().to_path_buf(),
        })?;

        Ok(Self::of_bytes(&data))
    }
}

/// Checksum error types.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    /// File to digest cannot be read.
    #[error("failed to read {:?} for checksum", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ChecksumError> = std::result::Result<T, E>;
