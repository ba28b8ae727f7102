//! Extraction pipeline: scan, extract, resolve, walk, validate, build, write.

pub mod chunks;
pub mod context;
pub mod extract;
pub mod file_scanner;
pub mod keys;
pub mod manifest;
pub mod menu;
pub mod parsers;
pub mod resolve;
pub mod source;
pub mod validate;
pub mod walk;

pub use context::{BuildOutput, CheckOutput, RunContext, run_build, run_check};
pub use keys::KeyMap;
pub use source::{SourceContext, SourceLocation};
