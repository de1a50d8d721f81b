// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Registry builder for shell profile modules.
//!
//! Shell profile __modules__ are JSON documents describing environment
//! variables, aliases, functions, path entries, files, and checks. This crate
//! compiles a directory of them into a __registry__: an index, category
//! definitions, and per-version metadata that the profile CLI consumes.
//!
//! # See Also
//!
//! 1. [`RegistryBuilder`]
//! 2. [`Module`]

pub mod category;
pub mod checksum;
pub mod config;
pub mod module;
pub mod path;
pub mod registry;
pub mod scan;

pub use category::{Category, CategoryCatalog};
pub use config::{BuilderConfig, DuplicatePolicy, OutputMode};
pub use module::Module;
pub use registry::{BuildReport, RegistryBuilder, RegistryError};
pub use scan::{scan_modules, ModuleSet, ScannedModule};
