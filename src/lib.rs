//! intl-chunks - per-route translation chunks for next-intl projects
//!
//! Walks the import graph of every Next.js App Router entry file, collects the
//! translation keys each route can reach and writes one minimal message file
//! per route and locale, plus a manifest describing them. Menu definition
//! files get their own chunks so menu labels are not duplicated per route.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (build, check, init)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction pipeline (scan, extract, walk, manifest, chunks)
//! - `issues`: Issue type definitions and reporting
//! - `plugin`: Incremental build-tool integration
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod plugin;
pub mod utils;
